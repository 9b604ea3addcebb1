/// A parsed record as produced by a source adapter, before validity
/// filtering and encoding.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawRecord {
    /// Record identifier, may be empty for malformed headers
    pub id: String,
    /// Raw residue string
    pub residues: String,
}
impl RawRecord {
    pub fn new<I: Into<String>, R: Into<String>>(id: I, residues: R) -> Self {
        Self {
            id: id.into(),
            residues: residues.into(),
        }
    }
}

/// A validated, encoded record flowing through the pipeline.
///
/// Produced by the sharded iterator and never mutated afterward.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SequenceRecord {
    /// 1-based ordinal of the record in the original, unsharded stream
    pub index: u64,
    /// Record identifier
    pub id: String,
    /// Raw residue string
    pub residues: String,
    /// Per-symbol vocabulary codes, zero for unknown symbols
    pub encoded: Vec<u32>,
    /// Numeric label, absent when no label source was supplied
    pub label: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_new() {
        let raw = RawRecord::new("P12345", "MKTAY");
        assert_eq!(raw.id, "P12345");
        assert_eq!(raw.residues, "MKTAY");
    }

    #[test]
    fn test_sequence_record_fields() {
        let record = SequenceRecord {
            index: 7,
            id: "P12345".to_string(),
            residues: "MK".to_string(),
            encoded: vec![12, 9],
            label: Some(3),
        };
        assert_eq!(record.index, 7);
        assert_eq!(record.encoded.len(), record.residues.len());
        assert_eq!(record.label, Some(3));
    }
}
