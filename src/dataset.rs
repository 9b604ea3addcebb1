//! File-backed dataset orchestration.
//!
//! A [`SequenceDataset`] ties together the FASTA path, the vocabulary, an
//! optional label table, and the skip counter shared by every iterator it
//! creates. Datasets are cheap to clone; clones share the counter and the
//! immutable lookup structures, which is what makes multi-worker iteration
//! over the same file coherent.

use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use rand::rngs::SmallRng;

use crate::{
    BoxedReader, FastaReader, LabelLookup, LabelTable, ParallelProcessor, ParallelReader,
    ShardIterator, ShuffleIter, SkipCounter, Vocabulary, WorkerShard,
};

/// Record iterator over one worker's shard of a dataset file.
pub type DatasetIter = ShardIterator<FastaReader<BufReader<BoxedReader>>>;

/// A FASTA-backed record dataset supporting sharded parallel iteration.
///
/// Every iterator handed out by a dataset opens its own handle on the file,
/// so workers never contend on a shared cursor; the only state they share is
/// the skip counter and the read-only vocabulary and label table.
///
/// # Examples
///
/// ```rust,no_run
/// use seqshard::{Batches, CollateOptions, LabelTable, SequenceDataset, WorkerShard};
///
/// # fn main() -> seqshard::Result<()> {
/// let labels = LabelTable::from_path("train_labels.csv")?;
/// let dataset = SequenceDataset::new("train.fa.gz").with_labels(labels);
///
/// // Worker 0 of 4, shuffled within a 1024-record window, batches of 32
/// let records = dataset.shuffled_worker_iter(WorkerShard::new(0, 4)?, 1024)?;
/// for batch in Batches::new(records, 32, CollateOptions::default())? {
///     let batch = batch?;
///     println!("{} rows of {}", batch.n_records(), batch.seq_len());
/// }
/// println!("skipped {} invalid records", dataset.skipped());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SequenceDataset {
    path: PathBuf,
    vocab: Arc<Vocabulary>,
    labels: Option<Arc<LabelTable>>,
    skipped: SkipCounter,
}

impl SequenceDataset {
    /// Creates a dataset over a FASTA file with the extended protein
    /// vocabulary and no labels.
    ///
    /// The file is not opened until an iterator is requested.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            vocab: Arc::new(Vocabulary::extended_protein()),
            labels: None,
            skipped: SkipCounter::new(),
        }
    }

    /// Replaces the encoding vocabulary.
    pub fn with_vocab(mut self, vocab: Vocabulary) -> Self {
        self.vocab = Arc::new(vocab);
        self
    }

    /// Attaches a label table. Labeled iteration skips records without an
    /// entry and counts them on the shared counter.
    pub fn with_labels(mut self, labels: LabelTable) -> Self {
        self.labels = Some(Arc::new(labels));
        self
    }

    /// The dataset file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The encoding vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// The attached label table, if any.
    pub fn labels(&self) -> Option<&LabelTable> {
        self.labels.as_deref()
    }

    /// Records skipped so far across every iterator created by this dataset
    /// (and its clones).
    pub fn skipped(&self) -> u64 {
        self.skipped.value()
    }

    /// A handle on the shared skip counter.
    pub fn skip_counter(&self) -> SkipCounter {
        self.skipped.clone()
    }

    /// Number of distinct labeled ids when a label table is attached; the
    /// dataset's nominal length under labels.
    pub fn labeled_len(&self) -> Option<usize> {
        self.labels.as_ref().map(|table| table.len())
    }

    /// Opens an iterator over one worker's shard of the file.
    ///
    /// Each call opens an independent handle, so any number of workers can
    /// iterate the same dataset concurrently.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn worker_iter(&self, shard: WorkerShard) -> crate::Result<DatasetIter> {
        let source = FastaReader::from_path(&self.path)?;
        let mut iter = ShardIterator::new(source, shard, Arc::clone(&self.vocab))
            .with_skip_counter(self.skipped.clone());
        if let Some(labels) = &self.labels {
            iter = iter.with_labels(Arc::clone(labels) as Arc<dyn LabelLookup + Send + Sync>);
        }
        Ok(iter)
    }

    /// Opens a single-worker iterator over the whole file.
    pub fn iter(&self) -> crate::Result<DatasetIter> {
        self.worker_iter(WorkerShard::single())
    }

    /// Opens a worker iterator wrapped in a shuffle buffer of the given
    /// capacity, seeded from the operating system.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or `capacity` is zero.
    pub fn shuffled_worker_iter(
        &self,
        shard: WorkerShard,
        capacity: usize,
    ) -> crate::Result<ShuffleIter<DatasetIter, SmallRng>> {
        ShuffleIter::new(self.worker_iter(shard)?, capacity)
    }
}

impl ParallelReader for SequenceDataset {
    /// Drains every shard of the dataset through clones of `processor`, one
    /// thread per worker.
    ///
    /// `num_workers == 0` uses all available cores; explicit requests are
    /// capped at the core count. The resolved worker count defines the shard
    /// layout, so the same dataset can legitimately partition differently on
    /// different machines.
    fn process_parallel<P: ParallelProcessor + Clone + 'static>(
        &self,
        processor: P,
        num_workers: usize,
    ) -> crate::Result<()> {
        let num_workers = if num_workers == 0 {
            num_cpus::get()
        } else {
            num_workers.min(num_cpus::get())
        };

        let mut handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let dataset = self.clone();
            let mut worker_processor = processor.clone();
            let handle = thread::spawn(move || -> crate::Result<()> {
                worker_processor.set_worker_id(worker_id);
                let shard = WorkerShard::new(worker_id, num_workers)?;
                for result in dataset.worker_iter(shard)? {
                    worker_processor.process_record(result?)?;
                }
                worker_processor.on_worker_complete()?;
                Ok(())
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap()?;
        }
        Ok(())
    }
}
