//! Collation of variable-length encoded records into rectangular batches.

use rand::Rng;

use crate::{SeqshardError, SequenceRecord};

/// Default lower bound on the padded row length.
pub const DEFAULT_MIN_LENGTH: usize = 36;

/// Collation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollateOptions {
    /// Pad rows with the zero code. Disabling this is rejected at collation
    /// time; downstream consumers require rectangular batches.
    pub zero_padding: bool,

    /// Rows are never shorter than this, regardless of the records in the
    /// batch.
    pub min_length: usize,

    /// Place each shorter record at a uniformly random offset within its row
    /// instead of left-aligning it.
    pub random_padding: bool,
}

impl Default for CollateOptions {
    fn default() -> Self {
        Self {
            zero_padding: true,
            min_length: DEFAULT_MIN_LENGTH,
            random_padding: false,
        }
    }
}

/// A rectangular batch of encoded records.
///
/// Rows are stored as a single flat `u32` buffer of `n_records * seq_len`
/// codes in row-major order, ready for zero-copy handoff to numeric
/// consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollatedBatch {
    /// Stream position of each record, in input order
    pub indices: Vec<u64>,

    /// Identifier of each record, in input order
    pub ids: Vec<String>,

    /// Class labels, present only when every record in the batch carried one
    pub labels: Option<Vec<i64>>,

    /// Flat row-major code matrix
    sequences: Vec<u32>,

    n_records: usize,
    max_len: usize,
}

impl CollatedBatch {
    /// Number of records in the batch.
    pub fn n_records(&self) -> usize {
        self.n_records
    }

    /// Length of every row.
    pub fn seq_len(&self) -> usize {
        self.max_len
    }

    /// Codes of the `i`-th record, padding included.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_records`.
    pub fn row(&self, i: usize) -> &[u32] {
        &self.sequences[i * self.max_len..(i + 1) * self.max_len]
    }

    /// The flat row-major code matrix.
    pub fn sequences(&self) -> &[u32] {
        &self.sequences
    }

    /// The code matrix reinterpreted as native-endian bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.sequences)
    }
}

/// Collates a batch of records into a zero-padded rectangular matrix.
///
/// The row length is the longest encoded record in the batch, floored at
/// `options.min_length`. Shorter records are left-aligned unless
/// `options.random_padding` is set, in which case each is placed at a
/// uniformly random offset within its row. Labels are collected only when
/// every record carries one.
///
/// # Errors
///
/// Fails if the batch is empty or if `options.zero_padding` is false.
///
/// # Examples
///
/// ```rust
/// use seqshard::{collate, CollateOptions, SequenceRecord, Vocabulary};
///
/// # fn main() -> seqshard::Result<()> {
/// let vocab = Vocabulary::extended_protein();
/// let batch: Vec<SequenceRecord> = [(1, "a", "MKV"), (2, "b", "GA")]
///     .into_iter()
///     .map(|(index, id, residues)| SequenceRecord {
///         index,
///         id: id.to_string(),
///         residues: residues.to_string(),
///         encoded: vocab.encode(residues),
///         label: None,
///     })
///     .collect();
///
/// let collated = collate(&batch, CollateOptions::default())?;
/// assert_eq!(collated.n_records(), 2);
/// assert_eq!(collated.seq_len(), 36);
/// assert_eq!(&collated.row(0)[..3], vocab.encode("MKV").as_slice());
/// assert_eq!(collated.row(0)[3], 0);
/// # Ok(())
/// # }
/// ```
pub fn collate(batch: &[SequenceRecord], options: CollateOptions) -> crate::Result<CollatedBatch> {
    collate_with_rng(batch, options, &mut rand::rng())
}

/// Collates with a caller-supplied generator for the random-padding offsets.
///
/// Behaves exactly like [`collate`]; the generator is only consulted when
/// `options.random_padding` is set and a record is shorter than the row.
pub fn collate_with_rng<R: Rng>(
    batch: &[SequenceRecord],
    options: CollateOptions,
    rng: &mut R,
) -> crate::Result<CollatedBatch> {
    if !options.zero_padding {
        return Err(SeqshardError::PaddingDisabled);
    }
    if batch.is_empty() {
        return Err(SeqshardError::EmptyBatch);
    }

    let longest = batch.iter().map(|r| r.encoded.len()).max().unwrap_or(0);
    let max_len = options.min_length.max(longest);

    let mut sequences = vec![0u32; batch.len() * max_len];
    for (row, record) in batch.iter().enumerate() {
        let len = record.encoded.len();
        let offset = if options.random_padding && len < max_len {
            rng.random_range(0..=max_len - len)
        } else {
            0
        };
        let start = row * max_len + offset;
        sequences[start..start + len].copy_from_slice(&record.encoded);
    }

    Ok(CollatedBatch {
        indices: batch.iter().map(|r| r.index).collect(),
        ids: batch.iter().map(|r| r.id.clone()).collect(),
        labels: batch.iter().map(|r| r.label).collect(),
        sequences,
        n_records: batch.len(),
        max_len,
    })
}

/// Iterator adapter grouping a record stream into collated batches.
///
/// Pulls up to `batch_size` records at a time and collates each group; the
/// final batch may be smaller. A record-level error is emitted in place of a
/// batch, discards the partially assembled group, and ends the stream.
///
/// # Examples
///
/// ```rust
/// use seqshard::{Batches, CollateOptions, MemorySource, RawRecord, ShardIterator, Vocabulary, WorkerShard};
/// use std::sync::Arc;
///
/// # fn main() -> seqshard::Result<()> {
/// let records: Vec<RawRecord> = (0..7)
///     .map(|i| RawRecord::new(format!("seq{}", i), "MKV".to_string()))
///     .collect();
/// let iter = ShardIterator::new(
///     MemorySource::new(records),
///     WorkerShard::single(),
///     Arc::new(Vocabulary::extended_protein()),
/// );
///
/// let sizes: Vec<usize> = Batches::new(iter, 3, CollateOptions::default())?
///     .map(|result| result.map(|batch| batch.n_records()))
///     .collect::<seqshard::Result<_>>()?;
/// assert_eq!(sizes, [3, 3, 1]);
/// # Ok(())
/// # }
/// ```
pub struct Batches<I, R> {
    inner: I,
    rng: R,
    batch_size: usize,
    options: CollateOptions,
    done: bool,
}

impl<I> Batches<I, rand::rngs::ThreadRng>
where
    I: Iterator<Item = crate::Result<SequenceRecord>>,
{
    /// Creates a batching adapter over a record stream.
    ///
    /// # Errors
    ///
    /// Returns an error if `batch_size` is zero.
    pub fn new(inner: I, batch_size: usize, options: CollateOptions) -> crate::Result<Self> {
        Self::with_rng(inner, batch_size, options, rand::rng())
    }
}

impl<I, R> Batches<I, R>
where
    I: Iterator<Item = crate::Result<SequenceRecord>>,
    R: Rng,
{
    /// Creates a batching adapter with a caller-supplied generator for the
    /// random-padding offsets.
    ///
    /// # Errors
    ///
    /// Returns an error if `batch_size` is zero.
    pub fn with_rng(
        inner: I,
        batch_size: usize,
        options: CollateOptions,
        rng: R,
    ) -> crate::Result<Self> {
        if batch_size == 0 {
            return Err(SeqshardError::EmptyBatchSize);
        }
        Ok(Self {
            inner,
            rng,
            batch_size,
            options,
            done: false,
        })
    }

    /// Records per batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Collation settings applied to every batch.
    pub fn options(&self) -> CollateOptions {
        self.options
    }
}

impl<I, R> Iterator for Batches<I, R>
where
    I: Iterator<Item = crate::Result<SequenceRecord>>,
    R: Rng,
{
    type Item = crate::Result<CollatedBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut chunk = Vec::with_capacity(self.batch_size);
        while chunk.len() < self.batch_size {
            match self.inner.next() {
                Some(Ok(record)) => chunk.push(record),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        if chunk.is_empty() {
            return None;
        }
        Some(collate_with_rng(&chunk, self.options, &mut self.rng))
    }
}
