//! Label tables mapping sequence ids to numeric class codes.
//!
//! Tables are CSV files with a header line and a leading index column, as
//! produced by common dataframe tooling. Identifiers are taken from a column
//! named `protein_id` (falling back to the first data column) and class names
//! from a column named `eggnog_id` (falling back to the last column).

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;

use crate::{LabelLookup, SeqshardError};

/// Maps class names to dense numeric codes.
///
/// Fitting sorts the distinct class names and assigns codes `0..n` in that
/// order, so the same set of classes always produces the same codes. An
/// encoder fitted on training data can be reused to transform validation
/// tables into the identical code space.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabelEncoder {
    /// Distinct class names in code order
    classes: Vec<String>,
    index: HashMap<String, i64>,
}

impl LabelEncoder {
    /// Fits an encoder on a collection of class names.
    ///
    /// Duplicates are collapsed; codes follow the lexicographic order of the
    /// distinct names.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqshard::LabelEncoder;
    ///
    /// # fn main() -> seqshard::Result<()> {
    /// let encoder = LabelEncoder::fit(["COG0002", "COG0001", "COG0002"]);
    /// assert_eq!(encoder.len(), 2);
    /// assert_eq!(encoder.transform("COG0001")?, 0);
    /// assert_eq!(encoder.transform("COG0002")?, 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn fit<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = classes
            .into_iter()
            .map(|class| class.as_ref().to_string())
            .collect();
        let classes: Vec<String> = unique.into_iter().collect();
        let index = classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.clone(), code as i64))
            .collect();
        Self { classes, index }
    }

    /// Returns the code of a class name.
    ///
    /// # Errors
    ///
    /// Returns an error if the class was not seen during fitting.
    pub fn transform(&self, class: &str) -> crate::Result<i64> {
        self.index
            .get(class)
            .copied()
            .ok_or_else(|| SeqshardError::UnknownClass {
                class: class.to_string(),
            })
    }

    /// Returns the class name of a code.
    pub fn class(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|code| self.classes.get(code))
            .map(String::as_str)
    }

    /// Distinct class names in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of distinct classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the encoder holds no classes.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// A parsed label table: sequence id to numeric class code.
///
/// Duplicate ids are allowed; the last occurrence wins, so later tables and
/// rows deliberately override earlier ones.
///
/// # Examples
///
/// ```rust
/// use seqshard::{LabelLookup, LabelTable};
///
/// # fn main() -> seqshard::Result<()> {
/// let csv = "\
/// ,protein_id,eggnog_id
/// 0,seq1,COG0002
/// 1,seq2,COG0001
/// ";
/// let table = LabelTable::from_reader(csv.as_bytes())?;
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.lookup("seq1"), Some(1));
/// assert_eq!(table.lookup("seq2"), Some(0));
/// assert_eq!(table.encoder().class(1), Some("COG0002"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    encoder: LabelEncoder,
    label_by_id: HashMap<String, i64>,
}

impl LabelTable {
    /// Reads a label table, fitting a fresh encoder on its class column.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV is unreadable or structurally invalid.
    pub fn from_reader<R: Read>(reader: R) -> crate::Result<Self> {
        let rows = parse_rows(reader)?;
        let encoder = LabelEncoder::fit(rows.iter().map(|(_, class)| class));
        Self::build(rows, encoder)
    }

    /// Reads a label table, transforming its classes with an existing
    /// encoder.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV is invalid or contains a class the
    /// encoder has not seen.
    pub fn from_reader_with_encoder<R: Read>(
        reader: R,
        encoder: LabelEncoder,
    ) -> crate::Result<Self> {
        let rows = parse_rows(reader)?;
        Self::build(rows, encoder)
    }

    /// Reads a label table from a file path.
    ///
    /// Automatically detects and handles compressed files (gzip, zstd) when
    /// the `niffler` feature is enabled.
    pub fn from_path<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let rdr = File::open(path).map(BufReader::new)?;

        #[cfg(feature = "niffler")]
        {
            let (pt, _format) = niffler::send::get_reader(Box::new(rdr))?;
            Self::from_reader(pt)
        }
        #[cfg(not(feature = "niffler"))]
        {
            Self::from_reader(rdr)
        }
    }

    /// Reads a label table from a file path with an existing encoder.
    pub fn from_path_with_encoder<P: AsRef<Path>>(
        path: P,
        encoder: LabelEncoder,
    ) -> crate::Result<Self> {
        let rdr = File::open(path).map(BufReader::new)?;

        #[cfg(feature = "niffler")]
        {
            let (pt, _format) = niffler::send::get_reader(Box::new(rdr))?;
            Self::from_reader_with_encoder(pt, encoder)
        }
        #[cfg(not(feature = "niffler"))]
        {
            Self::from_reader_with_encoder(rdr, encoder)
        }
    }

    fn build(rows: Vec<(String, String)>, encoder: LabelEncoder) -> crate::Result<Self> {
        let mut label_by_id = HashMap::with_capacity(rows.len());
        let mut overwritten = 0usize;
        for (id, class) in rows {
            let code = encoder.transform(&class)?;
            if label_by_id.insert(id, code).is_some() {
                overwritten += 1;
            }
        }
        if overwritten > 0 {
            debug!(
                "{} duplicate sequence ids in label table (last occurrence wins)",
                overwritten
            );
        }
        Ok(Self {
            encoder,
            label_by_id,
        })
    }

    /// The encoder backing this table.
    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    /// Number of distinct labeled ids.
    pub fn len(&self) -> usize {
        self.label_by_id.len()
    }

    /// Whether the table holds no labels.
    pub fn is_empty(&self) -> bool {
        self.label_by_id.is_empty()
    }
}

impl LabelLookup for LabelTable {
    fn lookup(&self, id: &str) -> Option<i64> {
        self.label_by_id.get(id).copied()
    }
}

/// Extracts `(id, class)` pairs from a headered CSV with a leading index
/// column.
fn parse_rows<R: Read>(reader: R) -> crate::Result<Vec<(String, String)>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.len() < 3 {
        return Err(SeqshardError::MalformedLabelTable {
            line: 1,
            reason: "expected an index column, an identifier column, and a class column"
                .to_string(),
        });
    }

    // The index column never participates in the named-column search
    let id_col = headers
        .iter()
        .skip(1)
        .position(|h| h == "protein_id")
        .map(|p| p + 1)
        .unwrap_or(1);
    let class_col = headers
        .iter()
        .skip(1)
        .position(|h| h == "eggnog_id")
        .map(|p| p + 1)
        .unwrap_or(headers.len() - 1);
    if id_col == class_col {
        return Err(SeqshardError::MalformedLabelTable {
            line: 1,
            reason: "identifier and class columns coincide".to_string(),
        });
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let id = record
            .get(id_col)
            .ok_or_else(|| SeqshardError::MalformedLabelTable {
                line,
                reason: "missing identifier column".to_string(),
            })?;
        let class = record
            .get(class_col)
            .ok_or_else(|| SeqshardError::MalformedLabelTable {
                line,
                reason: "missing class column".to_string(),
            })?;
        if class.is_empty() {
            return Err(SeqshardError::MalformedLabelTable {
                line,
                reason: "empty class name".to_string(),
            });
        }

        rows.push((id.to_string(), class.to_string()));
    }
    Ok(rows)
}
