use crate::{Result, SequenceRecord};

/// Trait for types that can consume a sharded record stream in parallel.
///
/// This is implemented by the **processor** not by the **dataset**.
/// For the **dataset**, see the [`ParallelReader`] trait.
pub trait ParallelProcessor: Send + Clone {
    /// Process a single record
    fn process_record(&mut self, record: SequenceRecord) -> Result<()>;

    /// Called when a worker finishes draining its shard
    /// Default implementation does nothing
    fn on_worker_complete(&mut self) -> Result<()> {
        Ok(())
    }

    /// Set the worker ID for this processor
    ///
    /// Each worker thread calls this method with its own unique ID before
    /// processing any records.
    fn set_worker_id(&mut self, _worker_id: usize) {
        // Default implementation does nothing
    }

    /// Get the worker ID for this processor
    fn worker_id(&self) -> Option<usize> {
        None
    }
}

/// Trait for datasets whose shards can be drained in parallel.
///
/// This is implemented by the **dataset** not by the **processor**.
/// For the **processor**, see the [`ParallelProcessor`] trait.
pub trait ParallelReader {
    fn process_parallel<P: ParallelProcessor + Clone + 'static>(
        &self,
        processor: P,
        num_workers: usize,
    ) -> Result<()>;
}
