//! Error handling for the seqshard library.
//!
//! This module defines all error types that can occur while building datasets,
//! including I/O errors, configuration validation errors, malformed-input errors,
//! and processing errors.

use std::error::Error as StdError;
use thiserror::Error;

/// A specialized `Result` type for seqshard operations.
///
/// This type is used throughout the library for any operation that can fail.
/// It's equivalent to `std::result::Result<T, SeqshardError>`.
///
/// # Examples
///
/// ```rust
/// use seqshard::{Result, Vocabulary};
///
/// fn build_vocab() -> Result<Vocabulary> {
///     let vocab = Vocabulary::new("ACGT")?;
///     Ok(vocab)
/// }
/// ```
pub type Result<T> = std::result::Result<T, SeqshardError>;

/// Error types for seqshard operations.
///
/// This enum covers all possible error conditions that can occur when streaming,
/// sharding, shuffling, or collating sequence records. Each variant provides
/// specific context about what went wrong to help with debugging and error
/// handling.
///
/// # Examples
///
/// ```rust
/// use seqshard::{SeqshardError, Vocabulary};
///
/// // Handle specific error types
/// match Vocabulary::new("AACD") {
///     Err(SeqshardError::DuplicateSymbol { symbol }) => {
///         println!("Alphabet repeats the letter {}", symbol);
///     },
///     Err(e) => {
///         println!("Other error: {}", e);
///     },
///     Ok(_) => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum SeqshardError {
    /// I/O error from the underlying reader.
    ///
    /// This wraps standard I/O errors that can occur when reading from files,
    /// network streams, or other I/O sources.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Compression/decompression error from niffler.
    ///
    /// This occurs when there are problems with compressed file formats
    /// like gzip or zstd when the `niffler` feature is enabled.
    #[cfg(feature = "niffler")]
    #[error("Niffler error")]
    Niffler(#[from] niffler::Error),

    /// CSV error from the label table parser.
    ///
    /// This wraps format errors raised while reading a label table, such as
    /// rows with inconsistent field counts or invalid UTF-8.
    #[error("CSV error")]
    Csv(#[from] csv::Error),

    /// The alphabet repeats a letter after case folding.
    ///
    /// Each alphabet letter must map to exactly one code; a repeated letter
    /// would silently overwrite an earlier mapping.
    #[error("Duplicate alphabet letter after case folding: {symbol}")]
    DuplicateSymbol { symbol: char },

    /// The alphabet contains a non-ASCII character.
    ///
    /// Vocabulary codes are resolved per byte, so alphabets are restricted to
    /// ASCII symbols.
    #[error("Non-ASCII alphabet letter: {symbol}")]
    NonAsciiSymbol { symbol: char },

    /// Worker ordinal is outside the valid range for the worker count.
    ///
    /// Worker ids are zero-based and must be strictly less than the worker
    /// count, which itself must be at least 1.
    #[error("Invalid worker ({worker_id}) - must be less than worker count ({worker_count})")]
    InvalidWorker {
        worker_id: usize,
        worker_count: usize,
    },

    /// Shuffle buffer capacity of zero.
    ///
    /// A reservoir needs at least one slot; disable shuffling instead of
    /// requesting an empty buffer.
    #[error("Shuffle buffer capacity must be at least 1")]
    EmptyShuffleBuffer,

    /// Batch size of zero.
    #[error("Batch size must be at least 1")]
    EmptyBatchSize,

    /// Batch collation was called with no records.
    ///
    /// Collation needs at least one record to determine the batch width.
    #[error("Cannot collate an empty batch")]
    EmptyBatch,

    /// Batch collation was configured without zero padding.
    ///
    /// Downstream consumers require rectangular batches; callers that need
    /// unpadded records must use batch size one upstream.
    #[error("Batch collation requires zero padding")]
    PaddingDisabled,

    /// Malformed FASTA input at the given line.
    ///
    /// This occurs when sequence data appears before any `>` header, which
    /// leaves the parser with residues that belong to no record.
    #[error("Malformed FASTA input at line {line}: expected a '>' header")]
    MalformedFasta { line: u64 },

    /// Malformed label table row or layout.
    ///
    /// This occurs when the table is missing the id/class columns or a row
    /// lacks the resolved fields.
    #[error("Malformed label table at line {line}: {reason}")]
    MalformedLabelTable { line: u64, reason: String },

    /// A class name was not seen when the label encoder was fitted.
    ///
    /// Raised by the validation flow, which transforms labels with a
    /// previously fitted encoder instead of fitting a fresh one.
    #[error("Class {class:?} absent from the fitted label encoder")]
    UnknownClass { class: String },

    /// Error occurred during parallel processing.
    ///
    /// This wraps errors that occur in user-defined parallel processors,
    /// allowing custom error types to be propagated through the parallel
    /// processing system.
    #[error("Processing error: {0}")]
    Process(Box<dyn StdError + Send + Sync>),
}

/// Trait for converting errors into `SeqshardError::Process` variants.
///
/// This trait provides a convenient way to convert custom error types
/// into seqshard errors for use in parallel processing contexts.
///
/// # Examples
///
/// ```rust
/// use seqshard::{IntoSeqshardError, SeqshardError};
/// use std::fmt;
///
/// #[derive(Debug)]
/// struct CustomError(String);
///
/// impl fmt::Display for CustomError {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "Custom error: {}", self.0)
///     }
/// }
///
/// impl std::error::Error for CustomError {}
///
/// // Convert to SeqshardError
/// let custom_err = CustomError("something went wrong".to_string());
/// let err = custom_err.into_seqshard_error();
///
/// match err {
///     SeqshardError::Process(_) => println!("Converted successfully"),
///     _ => unreachable!(),
/// }
/// ```
pub trait IntoSeqshardError {
    /// Converts the error into a `SeqshardError`.
    fn into_seqshard_error(self) -> SeqshardError;
}

/// Blanket implementation for all error types.
///
/// Any type that implements `std::error::Error + Send + Sync + 'static`
/// can be automatically converted to `SeqshardError::Process`.
impl<E> IntoSeqshardError for E
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn into_seqshard_error(self) -> SeqshardError {
        SeqshardError::Process(self.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct CustomError(String);

    impl fmt::Display for CustomError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Custom error: {}", self.0)
        }
    }

    impl std::error::Error for CustomError {}

    #[test]
    fn test_error_display_messages() {
        // Test DuplicateSymbol
        let err = SeqshardError::DuplicateSymbol { symbol: 'a' };
        let display = format!("{}", err);
        assert!(display.contains('a'));
        assert!(display.contains("case folding"));

        // Test InvalidWorker
        let err = SeqshardError::InvalidWorker {
            worker_id: 4,
            worker_count: 2,
        };
        let display = format!("{}", err);
        assert!(display.contains("(4)"));
        assert!(display.contains("(2)"));

        // Test MalformedFasta
        let err = SeqshardError::MalformedFasta { line: 12 };
        let display = format!("{}", err);
        assert!(display.contains("12"));

        // Test MalformedLabelTable
        let err = SeqshardError::MalformedLabelTable {
            line: 3,
            reason: "missing class field".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("line 3"));
        assert!(display.contains("missing class field"));

        // Test UnknownClass
        let err = SeqshardError::UnknownClass {
            class: "COG0001".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("COG0001"));

        // Test EmptyBatch
        let err = SeqshardError::EmptyBatch;
        let display = format!("{}", err);
        assert!(display.contains("empty batch"));

        // Test Process error
        let custom_err = CustomError("test error".to_string());
        let err = SeqshardError::Process(custom_err.into());
        let display = format!("{}", err);
        assert!(display.contains("Processing error"));
    }

    #[test]
    fn test_error_debug() {
        let err = SeqshardError::InvalidWorker {
            worker_id: 1,
            worker_count: 1,
        };
        let debug = format!("{:?}", err);
        assert!(debug.contains("InvalidWorker"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: SeqshardError = io_err.into();

        match err {
            SeqshardError::Io(inner) => {
                assert_eq!(inner.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_into_seqshard_error_trait() {
        let custom_err = CustomError("test".to_string());
        let err = custom_err.into_seqshard_error();

        match err {
            SeqshardError::Process(boxed) => {
                let display = format!("{}", boxed);
                assert!(display.contains("Custom error: test"));
            }
            _ => panic!("Expected Process variant"),
        }
    }

    #[test]
    fn test_result_type_alias() {
        fn test_function() -> Result<i32> {
            Ok(42)
        }

        fn failing_function() -> Result<i32> {
            Err(SeqshardError::EmptyBatch)
        }

        assert_eq!(test_function().unwrap(), 42);
        assert!(failing_function().is_err());
    }

    #[test]
    fn test_error_source_chain() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Access denied");
        let err = SeqshardError::Io(io_err);

        // Test that we can access the source error
        let source = err.source();
        assert!(source.is_some());

        if let Some(source) = source {
            let io_source = source.downcast_ref::<std::io::Error>();
            assert!(io_source.is_some());
            assert_eq!(
                io_source.unwrap().kind(),
                std::io::ErrorKind::PermissionDenied
            );
        }
    }

    #[test]
    fn test_error_send_sync() {
        // Ensure our error type is Send + Sync for threading
        fn is_send<T: Send>() {}
        fn is_sync<T: Sync>() {}

        is_send::<SeqshardError>();
        is_sync::<SeqshardError>();
    }
}
