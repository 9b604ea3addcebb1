//! Bounded-memory shuffling of a record stream.
//!
//! A [`ShuffleIter`] holds a fixed-capacity reservoir of records and emits a
//! randomly chosen occupant for every new record pulled from the underlying
//! iterator. Ordering is decorrelated within roughly one buffer length; this
//! is not a global shuffle.

use log::debug;
use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{SeqshardError, SequenceRecord};

/// Reservoir-style shuffling iterator adapter.
///
/// Wraps any iterator of record results and re-emits its records in
/// randomized order using a fixed-capacity buffer:
///
/// 1. **Fill**: up to `capacity` records are buffered in order on the first
///    pull. A stream shorter than the buffer shrinks the effective capacity
///    instead of erroring.
/// 2. **Steady state**: each new record evicts a randomly chosen occupant,
///    which is emitted, and takes its slot. The random draw spans every slot
///    except the last occupied one, so the record sitting in the final slot
///    only leaves the buffer during the drain. With an effective capacity of
///    1 the single slot is both filled and drained, and records pass through
///    in order.
/// 3. **Drain**: once the underlying iterator is exhausted, buffered records
///    are emitted last-in-first-out until the buffer is empty.
///
/// Every record pulled from the underlying iterator is emitted exactly once.
/// Errors pass through without disturbing the buffer. Dropping the adapter
/// mid-stream simply drops the buffered records; the underlying iterator is
/// not closed by this stage.
///
/// # Examples
///
/// ```rust
/// use rand::{rngs::SmallRng, SeedableRng};
/// use seqshard::{MemorySource, RawRecord, ShardIterator, ShuffleIter, Vocabulary, WorkerShard};
/// use std::sync::Arc;
///
/// # fn main() -> seqshard::Result<()> {
/// let records: Vec<RawRecord> = (0..10)
///     .map(|i| RawRecord::new(format!("seq{}", i), "MK".to_string()))
///     .collect();
/// let inner = ShardIterator::new(
///     MemorySource::new(records),
///     WorkerShard::single(),
///     Arc::new(Vocabulary::extended_protein()),
/// );
///
/// // Seeded for reproducible order
/// let shuffled = ShuffleIter::with_rng(inner, 4, SmallRng::seed_from_u64(42))?;
///
/// let mut ids: Vec<String> = shuffled
///     .map(|result| result.map(|record| record.id))
///     .collect::<seqshard::Result<_>>()?;
/// assert_eq!(ids.len(), 10);
///
/// // Same records, different order
/// ids.sort();
/// let mut expected: Vec<String> = (0..10).map(|i| format!("seq{}", i)).collect();
/// expected.sort();
/// assert_eq!(ids, expected);
/// # Ok(())
/// # }
/// ```
pub struct ShuffleIter<I, R> {
    /// Underlying record iterator
    inner: I,

    /// Slot-selection randomness
    rng: R,

    /// The reservoir; its length after the fill phase is the effective
    /// capacity
    buffer: Vec<SequenceRecord>,

    /// Requested capacity
    capacity: usize,

    /// Fill phase completed (or aborted by an error)
    filled: bool,

    /// Underlying iterator exhausted; emitting buffered records only
    draining: bool,
}

impl<I> ShuffleIter<I, SmallRng>
where
    I: Iterator<Item = crate::Result<SequenceRecord>>,
{
    /// Creates a shuffling adapter seeded from the operating system.
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero.
    pub fn new(inner: I, capacity: usize) -> crate::Result<Self> {
        Self::with_rng(inner, capacity, SmallRng::from_os_rng())
    }
}

impl<I, R> ShuffleIter<I, R>
where
    I: Iterator<Item = crate::Result<SequenceRecord>>,
    R: Rng,
{
    /// Creates a shuffling adapter with a caller-supplied generator.
    ///
    /// Use a seeded generator (e.g. `SmallRng::seed_from_u64`) to replay the
    /// same emission order.
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero.
    pub fn with_rng(inner: I, capacity: usize, rng: R) -> crate::Result<Self> {
        if capacity == 0 {
            return Err(SeqshardError::EmptyShuffleBuffer);
        }
        Ok(Self {
            inner,
            rng,
            buffer: Vec::with_capacity(capacity),
            capacity,
            filled: false,
            draining: false,
        })
    }

    /// Requested buffer capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records currently held in the buffer.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Chooses the slot to evict. The draw excludes the last occupied slot;
    /// the buffer is never empty when this is called.
    fn sample_slot(&mut self) -> usize {
        let bound = self.buffer.len() - 1;
        if bound == 0 {
            0
        } else {
            self.rng.random_range(0..bound)
        }
    }
}

impl<I, R> Iterator for ShuffleIter<I, R>
where
    I: Iterator<Item = crate::Result<SequenceRecord>>,
    R: Rng,
{
    type Item = crate::Result<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.filled {
            self.filled = true;
            while self.buffer.len() < self.capacity {
                match self.inner.next() {
                    Some(Ok(record)) => self.buffer.push(record),
                    Some(Err(e)) => return Some(Err(e)),
                    None => {
                        self.draining = true;
                        debug!(
                            "shuffle buffer shrunk to {} (stream shorter than capacity {})",
                            self.buffer.len(),
                            self.capacity
                        );
                        break;
                    }
                }
            }
        }

        if !self.draining {
            match self.inner.next() {
                Some(Ok(record)) => {
                    // A record arriving after an empty fill (the underlying
                    // iterator erred before buffering anything) passes straight
                    // through.
                    if self.buffer.is_empty() {
                        return Some(Ok(record));
                    }
                    let slot = self.sample_slot();
                    let evicted = std::mem::replace(&mut self.buffer[slot], record);
                    return Some(Ok(evicted));
                }
                Some(Err(e)) => return Some(Err(e)),
                None => self.draining = true,
            }
        }

        self.buffer.pop().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemorySource, RawRecord, ShardIterator, Vocabulary, WorkerShard};
    use std::sync::Arc;

    /// All-zero randomness: the sampled slot is always 0.
    struct ZeroRng;

    impl rand::RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
    }

    fn record(i: usize) -> SequenceRecord {
        SequenceRecord {
            index: i as u64 + 1,
            id: format!("seq{}", i),
            residues: "MK".to_string(),
            encoded: vec![12, 9],
            label: None,
        }
    }

    fn stream(n: usize) -> impl Iterator<Item = crate::Result<SequenceRecord>> {
        (0..n).map(|i| Ok(record(i)))
    }

    fn ids(results: Vec<crate::Result<SequenceRecord>>) -> Vec<String> {
        results
            .into_iter()
            .map(|r| r.unwrap().id)
            .collect()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = ShuffleIter::with_rng(stream(3), 0, ZeroRng);
        assert!(matches!(result, Err(SeqshardError::EmptyShuffleBuffer)));
    }

    #[test]
    fn test_multiset_preserved() {
        let shuffled = ShuffleIter::with_rng(stream(25), 7, SmallRng::seed_from_u64(7)).unwrap();
        let mut out = ids(shuffled.collect());
        assert_eq!(out.len(), 25);

        out.sort();
        let mut expected: Vec<String> = (0..25).map(|i| format!("seq{}", i)).collect();
        expected.sort();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_capacity_one_passes_through_in_order() {
        let shuffled = ShuffleIter::with_rng(stream(6), 1, SmallRng::seed_from_u64(0)).unwrap();
        let out = ids(shuffled.collect());
        let expected: Vec<String> = (0..6).map(|i| format!("seq{}", i)).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_pinned_reservoir_mechanics_capacity_three() {
        // Fill [0,1,2]; 3 evicts slot 0 (emit 0); 4 evicts slot 0 (emit 3);
        // drain pops 2, 1, 4.
        let shuffled = ShuffleIter::with_rng(stream(5), 3, ZeroRng).unwrap();
        let out = ids(shuffled.collect());
        assert_eq!(out, ["seq0", "seq3", "seq2", "seq1", "seq4"]);
    }

    #[test]
    fn test_last_slot_only_leaves_during_drain() {
        // With capacity 2 the draw range collapses to slot 0 for any
        // generator, so the fill-phase occupant of slot 1 must stay put until
        // the drain.
        let shuffled = ShuffleIter::with_rng(stream(5), 2, SmallRng::from_os_rng()).unwrap();
        let out = ids(shuffled.collect());
        assert_eq!(out, ["seq0", "seq2", "seq3", "seq1", "seq4"]);
    }

    #[test]
    fn test_short_stream_drains_in_reverse() {
        let shuffled = ShuffleIter::with_rng(stream(3), 10, ZeroRng).unwrap();
        let out = ids(shuffled.collect());
        assert_eq!(out, ["seq2", "seq1", "seq0"]);
    }

    #[test]
    fn test_empty_stream_emits_nothing() {
        let mut shuffled = ShuffleIter::with_rng(stream(0), 4, ZeroRng).unwrap();
        assert!(shuffled.next().is_none());
        assert!(shuffled.next().is_none());
    }

    #[test]
    fn test_errors_pass_through_and_buffer_survives() {
        let items: Vec<crate::Result<SequenceRecord>> = vec![
            Ok(record(0)),
            Err(SeqshardError::MalformedFasta { line: 9 }),
        ];
        let mut shuffled = ShuffleIter::with_rng(items.into_iter(), 2, ZeroRng).unwrap();

        // The error surfaces during the fill, before any record is emitted
        let first = shuffled.next().unwrap();
        assert!(matches!(
            first,
            Err(SeqshardError::MalformedFasta { line: 9 })
        ));

        // The record buffered before the error is still emitted exactly once
        let second = shuffled.next().unwrap().unwrap();
        assert_eq!(second.id, "seq0");
        assert!(shuffled.next().is_none());
    }

    #[test]
    fn test_over_sharded_input() {
        // End to end over a sharded iterator
        let records: Vec<RawRecord> = (0..9)
            .map(|i| RawRecord::new(format!("seq{}", i), "MK".to_string()))
            .collect();
        let inner = ShardIterator::new(
            MemorySource::new(records),
            WorkerShard::new(1, 2).unwrap(),
            Arc::new(Vocabulary::extended_protein()),
        );
        let shuffled = ShuffleIter::with_rng(inner, 3, SmallRng::seed_from_u64(3)).unwrap();

        let mut out = ids(shuffled.collect());
        out.sort();
        assert_eq!(out, ["seq1", "seq3", "seq5", "seq7"]);
    }
}
