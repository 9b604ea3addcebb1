//! Round-robin worker sharding over a sequential record source.
//!
//! Each worker walks an independent cursor over its own handle to the source,
//! discarding the records owned by other workers via cheap skips. No worker
//! communicates with another except through the shared [`SkipCounter`].

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use log::debug;

use crate::{LabelLookup, RecordSource, SeqshardError, SequenceRecord, Vocabulary};

/// A validated worker assignment.
///
/// Identifies which round-robin shard of the original stream a worker owns:
/// worker `w` of `n` sees original positions `w, w + n, w + 2n, ...`
/// (zero-based). Construction validates the range, so a `WorkerShard` value is
/// always usable.
///
/// # Examples
///
/// ```rust
/// use seqshard::{SeqshardError, WorkerShard};
///
/// let shard = WorkerShard::new(1, 4).unwrap();
/// assert_eq!(shard.worker_id(), 1);
/// assert_eq!(shard.worker_count(), 4);
///
/// assert!(matches!(
///     WorkerShard::new(4, 4),
///     Err(SeqshardError::InvalidWorker { .. })
/// ));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerShard {
    worker_id: usize,
    worker_count: usize,
}

impl WorkerShard {
    /// Creates a worker assignment for `worker_id` of `worker_count`.
    ///
    /// # Errors
    ///
    /// Returns an error if `worker_count` is zero or `worker_id` is not
    /// strictly less than `worker_count`.
    pub fn new(worker_id: usize, worker_count: usize) -> crate::Result<Self> {
        if worker_count == 0 || worker_id >= worker_count {
            return Err(SeqshardError::InvalidWorker {
                worker_id,
                worker_count,
            });
        }
        Ok(Self {
            worker_id,
            worker_count,
        })
    }

    /// The single-worker assignment (worker 0 of 1), which owns the entire
    /// stream.
    pub fn single() -> Self {
        Self {
            worker_id: 0,
            worker_count: 1,
        }
    }

    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Records to discard before this worker's first record.
    fn start(&self) -> usize {
        self.worker_id
    }

    /// Records to discard between two consecutive records of this worker.
    fn step(&self) -> usize {
        self.worker_count - 1
    }
}

impl Default for WorkerShard {
    fn default() -> Self {
        Self::single()
    }
}

/// Shared counter of records rejected by the validity filter.
///
/// Cloning yields another handle to the same counter, so a single counter can
/// be incremented from any number of workers concurrently and read once at
/// end-of-dataset for diagnostics. The count only grows; recreate the dataset
/// to reset it.
#[derive(Debug, Clone, Default)]
pub struct SkipCounter {
    count: Arc<AtomicU64>,
}

impl SkipCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one rejected record to the counter.
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Current total across all handles cloned from the same counter.
    pub fn value(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Cursor state of a sharded iterator.
enum ShardState {
    /// No record pulled yet; the initial `start`-skip is still pending
    Uninitialized,
    /// `pos` is the 1-based original-stream ordinal of the last evaluated slot
    Positioned { pos: u64 },
    /// Source exhausted or failed; terminal
    Exhausted,
}

/// Streaming iterator over one worker's shard of a record source.
///
/// Produces the subsequence of valid records belonging to one worker, in
/// original-stream order, each tagged with its 1-based original-stream ordinal
/// and its encoded form. Records with an empty id, or without a label when a
/// label source is attached, are counted on the shared [`SkipCounter`] and
/// skipped.
///
/// The iterator yields `Result` items: a source error is returned once and the
/// iterator becomes terminal. On clean end-of-stream the source's `close()` is
/// invoked exactly once.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use seqshard::{MemorySource, RawRecord, ShardIterator, Vocabulary, WorkerShard};
///
/// # fn main() -> seqshard::Result<()> {
/// let records = vec![
///     RawRecord::new("a", "MK"),
///     RawRecord::new("b", "TY"),
///     RawRecord::new("c", "AC"),
/// ];
/// let vocab = Arc::new(Vocabulary::extended_protein());
///
/// // Worker 0 of 2 owns original positions 0, 2, 4, ...
/// let shard = WorkerShard::new(0, 2)?;
/// let iter = ShardIterator::new(MemorySource::new(records), shard, vocab);
///
/// let ids: Vec<String> = iter
///     .map(|result| result.map(|record| record.id))
///     .collect::<seqshard::Result<_>>()?;
/// assert_eq!(ids, ["a", "c"]);
/// # Ok(())
/// # }
/// ```
pub struct ShardIterator<S: RecordSource> {
    /// Source handle owned exclusively by this worker
    source: S,

    /// This worker's shard assignment
    shard: WorkerShard,

    /// Shared symbol-to-code mapping
    vocab: Arc<Vocabulary>,

    /// Label source; attaching one makes labels required
    labels: Option<Arc<dyn LabelLookup + Send + Sync>>,

    /// Shared validity-filter reject counter
    skipped: SkipCounter,

    /// Cursor state
    state: ShardState,

    /// Records emitted by this iterator
    emitted: u64,
}

impl<S: RecordSource> ShardIterator<S> {
    /// Creates an iterator over `shard`'s portion of `source`.
    ///
    /// Without labels attached, only records with an empty id are filtered.
    /// The iterator starts with a fresh private [`SkipCounter`]; use
    /// [`with_skip_counter`](Self::with_skip_counter) to share one across
    /// workers.
    pub fn new(source: S, shard: WorkerShard, vocab: Arc<Vocabulary>) -> Self {
        Self {
            source,
            shard,
            vocab,
            labels: None,
            skipped: SkipCounter::new(),
            state: ShardState::Uninitialized,
            emitted: 0,
        }
    }

    /// Attaches a label source, making labels required.
    ///
    /// Records whose id does not resolve to a label are counted and skipped.
    pub fn with_labels(mut self, labels: Arc<dyn LabelLookup + Send + Sync>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Shares an externally owned skip counter.
    ///
    /// All iterators of one dataset should share the same counter so the
    /// aggregate reject count is observable in one place.
    pub fn with_skip_counter(mut self, skipped: SkipCounter) -> Self {
        self.skipped = skipped;
        self
    }

    /// This iterator's shard assignment.
    pub fn shard(&self) -> WorkerShard {
        self.shard
    }

    /// Number of records emitted so far by this iterator.
    pub fn records_emitted(&self) -> u64 {
        self.emitted
    }

    /// A handle to the skip counter this iterator increments.
    pub fn skip_counter(&self) -> SkipCounter {
        self.skipped.clone()
    }

    /// Marks the iterator terminal and surfaces the error.
    fn fail(&mut self, e: SeqshardError) -> Option<crate::Result<SequenceRecord>> {
        self.state = ShardState::Exhausted;
        Some(Err(e))
    }
}

impl<S: RecordSource> std::fmt::Debug for ShardIterator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardIterator")
            .field("shard", &self.shard)
            .field("vocab", &self.vocab)
            .field("skipped", &self.skipped)
            .field("emitted", &self.emitted)
            .finish_non_exhaustive()
    }
}

impl<S: RecordSource> Iterator for ShardIterator<S> {
    type Item = crate::Result<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        // Advance the cursor to the next slot this worker owns.
        let mut pos = match self.state {
            ShardState::Exhausted => return None,
            ShardState::Uninitialized => {
                if let Err(e) = self.source.skip_records(self.shard.start()) {
                    return self.fail(e);
                }
                self.shard.start() as u64 + 1
            }
            ShardState::Positioned { pos } => {
                if let Err(e) = self.source.skip_records(self.shard.step()) {
                    return self.fail(e);
                }
                pos + self.shard.step() as u64 + 1
            }
        };

        loop {
            let raw = match self.source.next_record() {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    self.state = ShardState::Exhausted;
                    debug!(
                        "worker {}/{} exhausted: {} records emitted, {} skipped in total",
                        self.shard.worker_id(),
                        self.shard.worker_count(),
                        self.emitted,
                        self.skipped.value()
                    );
                    if let Err(e) = self.source.close() {
                        return Some(Err(e));
                    }
                    return None;
                }
                Err(e) => return self.fail(e),
            };

            // Validity filter: the slot is consumed either way, so a reject
            // advances the cursor exactly like an accept would.
            let label = self.labels.as_ref().and_then(|l| l.lookup(&raw.id));
            if raw.id.is_empty() || (self.labels.is_some() && label.is_none()) {
                self.skipped.increment();
                if let Err(e) = self.source.skip_records(self.shard.step()) {
                    return self.fail(e);
                }
                pos += self.shard.step() as u64 + 1;
                continue;
            }

            let encoded = self.vocab.encode(&raw.residues);
            self.state = ShardState::Positioned { pos };
            self.emitted += 1;
            return Some(Ok(SequenceRecord {
                index: pos,
                id: raw.id,
                residues: raw.residues,
                encoded,
                label,
            }));
        }
    }
}
