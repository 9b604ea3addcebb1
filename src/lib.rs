//! # seqshard - Sharded Streaming of Biological Sequence Records
//!
//! `seqshard` is a Rust library for feeding protein sequence data to numeric
//! consumers (training loops, classifiers, embedding pipelines) from FASTA
//! files of arbitrary size. It streams records through a small, composable
//! pipeline with bounded memory at every stage:
//!
//! 1. **Sharding**: each worker deterministically claims an interleaved
//!    subsequence of the stream by skip arithmetic alone, with no coordination
//!    between workers.
//! 2. **Encoding**: residues are mapped to dense integer codes through a
//!    [`Vocabulary`], with `0` reserved for padding and unknown symbols.
//! 3. **Shuffling**: an optional fixed-capacity reservoir decorrelates record
//!    order without buffering the stream.
//! 4. **Collation**: encoded records are assembled into zero-padded
//!    rectangular batches ready for zero-copy handoff.
//!
//! Records with empty identifiers, or without an entry in an attached label
//! table, are counted on a shared [`SkipCounter`] and silently skipped rather
//! than surfaced as failures.
//!
//! ## Basic Usage
//!
//! ### Encoding and collating an in-memory stream
//!
//! ```rust
//! use seqshard::{collate, CollateOptions, MemorySource, RawRecord, ShardIterator, Vocabulary, WorkerShard};
//! use std::sync::Arc;
//!
//! # fn main() -> seqshard::Result<()> {
//! let source = MemorySource::new(vec![
//!     RawRecord::new("P00001", "MKVLAT"),
//!     RawRecord::new("P00002", "GARN"),
//!     RawRecord::new("P00003", "QEHILK"),
//! ]);
//!
//! // Encode and enumerate every record on a single worker
//! let records = ShardIterator::new(
//!     source,
//!     WorkerShard::single(),
//!     Arc::new(Vocabulary::extended_protein()),
//! )
//! .collect::<seqshard::Result<Vec<_>>>()?;
//!
//! assert_eq!(records.len(), 3);
//! assert_eq!(records[0].index, 1);
//! assert_eq!(records[0].encoded, [11, 9, 18, 10, 1, 17]);
//!
//! // Collate into one zero-padded batch
//! let batch = collate(&records, CollateOptions::default())?;
//! assert_eq!(batch.n_records(), 3);
//! assert_eq!(batch.seq_len(), 36);
//! assert_eq!(&batch.row(1)[..4], &records[1].encoded[..]);
//! # Ok(())
//! # }
//! ```
//!
//! ### Partitioning a stream across workers
//!
//! Worker `w` of `n` sees original stream positions `w + 1, w + n + 1, ...`
//! (positions are 1-based). The shards are disjoint and jointly cover the
//! stream, so parallel consumers never duplicate or lose a record:
//!
//! ```rust
//! use seqshard::{MemorySource, RawRecord, ShardIterator, Vocabulary, WorkerShard};
//! use std::sync::Arc;
//!
//! # fn main() -> seqshard::Result<()> {
//! let records: Vec<RawRecord> = (0..5)
//!     .map(|i| RawRecord::new(format!("seq{}", i), "MK"))
//!     .collect();
//! let vocab = Arc::new(Vocabulary::extended_protein());
//!
//! let indices = |worker_id| -> seqshard::Result<Vec<u64>> {
//!     ShardIterator::new(
//!         MemorySource::new(records.clone()),
//!         WorkerShard::new(worker_id, 2)?,
//!         Arc::clone(&vocab),
//!     )
//!     .map(|result| result.map(|record| record.index))
//!     .collect()
//! };
//!
//! assert_eq!(indices(0)?, [1, 3, 5]);
//! assert_eq!(indices(1)?, [2, 4]);
//! # Ok(())
//! # }
//! ```
//!
//! ### File-backed datasets with labels
//!
//! [`SequenceDataset`] owns the file path and shares one skip counter across
//! every iterator it creates. Compressed files (gzip, zstd) are handled
//! transparently when the `niffler` feature is enabled:
//!
//! ```rust,no_run
//! use seqshard::{Batches, CollateOptions, LabelTable, SequenceDataset, WorkerShard};
//!
//! # fn main() -> seqshard::Result<()> {
//! let labels = LabelTable::from_path("train_labels.csv")?;
//! let dataset = SequenceDataset::new("train.fa.gz").with_labels(labels);
//!
//! // Worker 0 of 4, shuffled within a 1024-record window, batches of 32
//! let records = dataset.shuffled_worker_iter(WorkerShard::new(0, 4)?, 1024)?;
//! for batch in Batches::new(records, 32, CollateOptions::default())? {
//!     let batch = batch?;
//!     println!(
//!         "batch of {} x {} ({} labels)",
//!         batch.n_records(),
//!         batch.seq_len(),
//!         batch.labels.as_ref().map_or(0, Vec::len),
//!     );
//! }
//! println!("skipped {} invalid records", dataset.skipped());
//! # Ok(())
//! # }
//! ```
//!
//! ### Parallel processing
//!
//! ```rust,no_run
//! use seqshard::{ParallelProcessor, ParallelReader, SequenceDataset, SequenceRecord};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Clone, Default)]
//! struct ResidueCounter {
//!     local_count: u64,
//!     global_count: Arc<Mutex<u64>>,
//! }
//!
//! impl ParallelProcessor for ResidueCounter {
//!     fn process_record(&mut self, record: SequenceRecord) -> seqshard::Result<()> {
//!         self.local_count += record.encoded.len() as u64;
//!         Ok(())
//!     }
//!
//!     fn on_worker_complete(&mut self) -> seqshard::Result<()> {
//!         let mut guard = self.global_count.lock().unwrap();
//!         *guard += self.local_count;
//!         self.local_count = 0;
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> seqshard::Result<()> {
//! let dataset = SequenceDataset::new("proteins.fa.gz");
//! let processor = ResidueCounter::default();
//! dataset.process_parallel(processor.clone(), 0)?; // 0 = use all available cores
//! println!("{} residues", processor.global_count.lock().unwrap());
//! # Ok(())
//! # }
//! ```
//!
//! ## Memory Characteristics
//!
//! No stage buffers the whole stream. Peak memory per worker is bounded by
//! the shuffle capacity plus one batch:
//! - Sharding holds one record at a time
//! - Shuffling holds at most `capacity` records
//! - Collation holds `batch_size` records plus the padded matrix
//! - Workers open independent file handles and share only an atomic counter
//!
//! ## Error Handling
//!
//! All operations return `Result<T, SeqshardError>` with detailed error
//! information. Invalid records are not errors; they are skipped and counted.
//!
//! ```rust
//! use seqshard::{SeqshardError, WorkerShard};
//!
//! # fn main() {
//! match WorkerShard::new(3, 2) {
//!     Err(SeqshardError::InvalidWorker { worker_id, worker_count }) => {
//!         println!("worker {} out of range for {} workers", worker_id, worker_count);
//!     }
//!     Err(e) => println!("Other error: {}", e),
//!     Ok(_) => unreachable!(),
//! }
//! # }
//! ```

mod constructs;
mod dataset;
mod error;
mod io;
mod parallel;
mod shard;
mod shuffle;
mod source;

pub use constructs::{
    collate, collate_with_rng, Batches, CollateOptions, CollatedBatch, RawRecord, SequenceRecord,
    Vocabulary, DEFAULT_MIN_LENGTH, EXTENDED_PROTEIN_ALPHABET, PAD_CODE,
};
pub use dataset::{DatasetIter, SequenceDataset};
pub use error::{IntoSeqshardError, Result, SeqshardError};
pub use io::{BoxedReader, FastaReader, LabelEncoder, LabelTable};
pub use parallel::{ParallelProcessor, ParallelReader};
pub use shard::{ShardIterator, SkipCounter, WorkerShard};
pub use shuffle::ShuffleIter;
pub use source::{LabelLookup, MemorySource, RecordSource};
