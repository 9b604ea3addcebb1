mod fasta;
mod labels;

pub use fasta::{BoxedReader, FastaReader};
pub use labels::{LabelEncoder, LabelTable};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ShardIterator, Vocabulary, WorkerShard};
    use std::io::Cursor;
    use std::sync::Arc;

    fn test_fasta() -> FastaReader<Cursor<Vec<u8>>> {
        let fasta = "\
>seq0\nMKVL\n>seq1\nGA\n>seq2\nRNDC\n>seq3\nQE\n";
        FastaReader::from_reader(Cursor::new(fasta.as_bytes().to_vec()))
    }

    fn test_labels() -> LabelTable {
        let csv = "\
,protein_id,eggnog_id
0,seq0,COG0002
1,seq2,COG0001
2,seq3,COG0002
";
        LabelTable::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_labeled_fasta_iteration() {
        let iter = ShardIterator::new(
            test_fasta(),
            WorkerShard::single(),
            Arc::new(Vocabulary::extended_protein()),
        )
        .with_labels(Arc::new(test_labels()));

        // seq1 has no label and is skipped
        let skipped = iter.skip_counter();
        let labeled: Vec<(String, Option<i64>)> = iter
            .map(|result| {
                let record = result.unwrap();
                (record.id, record.label)
            })
            .collect();

        assert_eq!(
            labeled,
            [
                ("seq0".to_string(), Some(1)),
                ("seq2".to_string(), Some(0)),
                ("seq3".to_string(), Some(1)),
            ]
        );
        assert_eq!(skipped.value(), 1);
    }

    #[test]
    fn test_unlabeled_fasta_iteration() {
        let iter = ShardIterator::new(
            test_fasta(),
            WorkerShard::single(),
            Arc::new(Vocabulary::extended_protein()),
        );

        let records: Vec<crate::SequenceRecord> = iter.map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.label.is_none()));
        assert_eq!(records[0].encoded, [11, 9, 18, 10]);
    }
}
