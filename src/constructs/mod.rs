mod batch;
mod record;
mod vocab;

pub use batch::{
    collate, collate_with_rng, Batches, CollateOptions, CollatedBatch, DEFAULT_MIN_LENGTH,
};
pub use record::{RawRecord, SequenceRecord};
pub use vocab::{Vocabulary, EXTENDED_PROTEIN_ALPHABET, PAD_CODE};
