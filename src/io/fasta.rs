//! Streaming FASTA input.
//!
//! [`FastaReader`] is the file-backed [`RecordSource`](crate::RecordSource):
//! it yields one raw record per FASTA entry and never holds more than the
//! current entry in memory.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::{RawRecord, RecordSource, SeqshardError};

/// Type-erased byte stream behind path-based constructors.
pub type BoxedReader = Box<dyn Read + Send>;

/// Streaming FASTA parser over any buffered reader.
///
/// Each entry starts at a `>` header line; the record id is the first
/// whitespace-delimited token after the `>` (a bare `>` yields an empty id,
/// which the sharded iterator counts and skips). Sequence lines up to the
/// next header are concatenated, with line endings and trailing whitespace
/// stripped. Blank lines are ignored. Non-blank content before the first
/// header is malformed.
///
/// # Examples
///
/// ```rust
/// use seqshard::{FastaReader, RecordSource};
/// use std::io::Cursor;
///
/// # fn main() -> seqshard::Result<()> {
/// let fasta = ">seq1 homolog of X\nMKVL\nQARN\n>seq2\nGA\n";
/// let mut reader = FastaReader::from_reader(Cursor::new(fasta));
///
/// let first = reader.next_record()?.unwrap();
/// assert_eq!(first.id, "seq1");
/// assert_eq!(first.residues, "MKVLQARN");
///
/// let second = reader.next_record()?.unwrap();
/// assert_eq!(second.id, "seq2");
/// assert!(reader.next_record()?.is_none());
/// # Ok(())
/// # }
/// ```
pub struct FastaReader<R> {
    /// Taken on close; a closed reader reports end-of-stream
    inner: Option<R>,

    /// Header of the next entry, captured while collecting the previous
    /// entry's sequence lines
    pending: Option<String>,

    /// Physical lines consumed, for error positions
    line: u64,
}

impl<R: BufRead> FastaReader<R> {
    /// Creates a parser over an already-buffered reader.
    pub fn from_reader(reader: R) -> Self {
        Self {
            inner: Some(reader),
            pending: None,
            line: 0,
        }
    }
}

impl FastaReader<BufReader<BoxedReader>> {
    /// Creates a parser from a file path.
    ///
    /// Automatically detects and handles compressed files (gzip, zstd) when
    /// the `niffler` feature is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decompression setup
    /// fails.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use seqshard::{FastaReader, RecordSource};
    ///
    /// # fn main() -> seqshard::Result<()> {
    /// let mut reader = FastaReader::from_path("proteins.fa.gz")?;
    /// while let Some(record) = reader.next_record()? {
    ///     println!("{}: {} residues", record.id, record.residues.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let rdr = File::open(path).map(BufReader::new)?;

        #[cfg(feature = "niffler")]
        {
            let (pt, _format) = niffler::send::get_reader(Box::new(rdr))?;
            Ok(Self::from_reader(BufReader::new(pt)))
        }
        #[cfg(not(feature = "niffler"))]
        {
            let boxed: BoxedReader = Box::new(rdr);
            Ok(Self::from_reader(BufReader::new(boxed)))
        }
    }

    /// Creates a parser reading from standard input.
    ///
    /// Automatically handles compressed input when the `niffler` feature is
    /// enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if decompression setup fails.
    pub fn from_stdin() -> crate::Result<Self> {
        let rdr: BoxedReader = Box::new(std::io::stdin());

        #[cfg(feature = "niffler")]
        {
            let (pt, _format) = niffler::send::get_reader(rdr)?;
            Ok(Self::from_reader(BufReader::new(pt)))
        }
        #[cfg(not(feature = "niffler"))]
        {
            Ok(Self::from_reader(BufReader::new(rdr)))
        }
    }

    /// Creates a parser from an optional file path, falling back to standard
    /// input when `None`.
    pub fn from_optional_path<P: AsRef<Path>>(path: Option<P>) -> crate::Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::from_stdin(),
        }
    }
}

impl<R: BufRead> RecordSource for FastaReader<R> {
    fn next_record(&mut self) -> crate::Result<Option<RawRecord>> {
        let reader = match self.inner.as_mut() {
            Some(reader) => reader,
            None => return Ok(None),
        };

        let header = match self.pending.take() {
            Some(header) => header,
            None => {
                let mut line = String::new();
                loop {
                    line.clear();
                    if reader.read_line(&mut line)? == 0 {
                        return Ok(None);
                    }
                    self.line += 1;

                    let trimmed = line.trim_end();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match trimmed.strip_prefix('>') {
                        Some(rest) => break rest.to_string(),
                        None => {
                            return Err(SeqshardError::MalformedFasta { line: self.line });
                        }
                    }
                }
            }
        };

        let id = header
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();

        let mut residues = String::new();
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            self.line += 1;

            let trimmed = line.trim_end();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(rest) = trimmed.strip_prefix('>') {
                self.pending = Some(rest.to_string());
                break;
            }
            residues.push_str(trimmed);
        }

        Ok(Some(RawRecord { id, residues }))
    }

    fn close(&mut self) -> crate::Result<()> {
        self.inner = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(fasta: &str) -> FastaReader<Cursor<Vec<u8>>> {
        FastaReader::from_reader(Cursor::new(fasta.as_bytes().to_vec()))
    }

    fn drain(fasta: &str) -> Vec<(String, String)> {
        let mut rdr = reader(fasta);
        let mut out = Vec::new();
        while let Some(record) = rdr.next_record().unwrap() {
            out.push((record.id, record.residues));
        }
        out
    }

    #[test]
    fn test_multiline_records() {
        let records = drain(">seq1 some description\nMKV\nLQ\n>seq2\nGA\n");
        assert_eq!(
            records,
            [
                ("seq1".to_string(), "MKVLQ".to_string()),
                ("seq2".to_string(), "GA".to_string()),
            ]
        );
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let records = drain(">a\r\nMK\r\n\r\nVL\r\n\r\n>b\r\nGA\r\n");
        assert_eq!(
            records,
            [
                ("a".to_string(), "MKVL".to_string()),
                ("b".to_string(), "GA".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_trailing_newline() {
        let records = drain(">a\nMK");
        assert_eq!(records, [("a".to_string(), "MK".to_string())]);
    }

    #[test]
    fn test_bare_header_yields_empty_id() {
        let records = drain(">\nMK\n> described but unnamed\nVL\n");
        assert_eq!(records[0], ("".to_string(), "MK".to_string()));
        assert_eq!(records[1], ("described".to_string(), "VL".to_string()));
    }

    #[test]
    fn test_header_only_record() {
        let records = drain(">a\n>b\nMK\n");
        assert_eq!(
            records,
            [
                ("a".to_string(), "".to_string()),
                ("b".to_string(), "MK".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let mut rdr = reader("");
        assert!(rdr.next_record().unwrap().is_none());
    }

    #[test]
    fn test_content_before_first_header() {
        let mut rdr = reader("\nMKV\n>a\nGA\n");
        let err = rdr.next_record().unwrap_err();
        assert!(matches!(err, SeqshardError::MalformedFasta { line: 2 }));
    }

    #[test]
    fn test_close_is_terminal_and_idempotent() {
        let mut rdr = reader(">a\nMK\n>b\nVL\n");
        assert_eq!(rdr.next_record().unwrap().unwrap().id, "a");

        rdr.close().unwrap();
        assert!(rdr.next_record().unwrap().is_none());
        rdr.close().unwrap();
        assert!(rdr.next_record().unwrap().is_none());
    }

    #[test]
    fn test_skip_records() {
        let mut rdr = reader(">a\nMK\n>b\nVL\n>c\nGA\n");
        rdr.skip_records(2).unwrap();
        assert_eq!(rdr.next_record().unwrap().unwrap().id, "c");
        assert!(rdr.next_record().unwrap().is_none());
    }
}
