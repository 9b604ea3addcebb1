//! Boundary traits between the sharded iterator and its collaborators.
//!
//! A [`RecordSource`] hands out raw records sequentially; a [`LabelLookup`]
//! resolves record ids to numeric labels. The sharded iterator is written
//! against these traits, so any parser or label store can be plugged in.

use std::collections::HashMap;

use crate::{RawRecord, Result};

/// Trait for sequential record sources.
///
/// This is implemented by parsers such as [`FastaReader`](crate::FastaReader)
/// and by [`MemorySource`]. End-of-stream is signaled as `Ok(None)`, distinct
/// from errors; errors are fatal for the worker consuming the source.
pub trait RecordSource {
    /// Pulls the next record, `Ok(None)` at end-of-stream.
    fn next_record(&mut self) -> Result<Option<RawRecord>>;

    /// Skips `n` records.
    ///
    /// The default implementation performs `n` discard-reads; sources with a
    /// cheaper way to advance may override it. Running past end-of-stream is
    /// not an error.
    fn skip_records(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            if self.next_record()?.is_none() {
                break;
            }
        }
        Ok(())
    }

    /// Releases the source.
    ///
    /// The sharded iterator calls this exactly once when the source signals
    /// end-of-stream. Implementations must be idempotent, and a closed source
    /// must keep reporting end-of-stream.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Trait for resolving record ids to numeric labels.
///
/// Supplying a lookup to a sharded iterator makes labels required: records
/// whose id resolves to `None` are counted and skipped.
pub trait LabelLookup {
    /// Returns the label for a record id, `None` when the id is unlabeled.
    fn lookup(&self, id: &str) -> Option<i64>;
}

impl LabelLookup for HashMap<String, i64> {
    fn lookup(&self, id: &str) -> Option<i64> {
        self.get(id).copied()
    }
}

/// An in-memory record source.
///
/// Serves records from a `Vec` in order. Useful for tests and for callers that
/// already hold parsed records.
///
/// # Examples
///
/// ```rust
/// use seqshard::{MemorySource, RawRecord, RecordSource};
///
/// # fn main() -> seqshard::Result<()> {
/// let mut source = MemorySource::new(vec![
///     RawRecord::new("a", "MK"),
///     RawRecord::new("b", "TY"),
/// ]);
///
/// assert_eq!(source.next_record()?.unwrap().id, "a");
/// assert_eq!(source.next_record()?.unwrap().id, "b");
/// assert!(source.next_record()?.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemorySource {
    records: Vec<RawRecord>,
    pos: usize,
    closed: bool,
}

impl MemorySource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            pos: 0,
            closed: false,
        }
    }
}

impl RecordSource for MemorySource {
    fn next_record(&mut self) -> Result<Option<RawRecord>> {
        if self.closed || self.pos >= self.records.len() {
            return Ok(None);
        }
        let record = self.records[self.pos].clone();
        self.pos += 1;
        Ok(Some(record))
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_of(ids: &[&str]) -> MemorySource {
        MemorySource::new(ids.iter().map(|id| RawRecord::new(*id, "MK")).collect())
    }

    #[test]
    fn test_memory_source_order() {
        let mut source = source_of(&["a", "b", "c"]);
        assert_eq!(source.next_record().unwrap().unwrap().id, "a");
        assert_eq!(source.next_record().unwrap().unwrap().id, "b");
        assert_eq!(source.next_record().unwrap().unwrap().id, "c");
        assert!(source.next_record().unwrap().is_none());
        // Stays exhausted
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_default_skip_discards_reads() {
        let mut source = source_of(&["a", "b", "c", "d"]);
        source.skip_records(2).unwrap();
        assert_eq!(source.next_record().unwrap().unwrap().id, "c");

        // Skipping past the end is not an error
        source.skip_records(10).unwrap();
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_close_is_idempotent_and_terminal() {
        let mut source = source_of(&["a", "b"]);
        source.close().unwrap();
        source.close().unwrap();
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_hashmap_label_lookup() {
        let mut labels = HashMap::new();
        labels.insert("a".to_string(), 3i64);

        assert_eq!(labels.lookup("a"), Some(3));
        assert_eq!(labels.lookup("b"), None);
    }
}
