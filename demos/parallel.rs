use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use rand::{rngs::SmallRng, Rng, SeedableRng};
use seqshard::{
    ParallelProcessor, ParallelReader, SequenceDataset, SequenceRecord,
    EXTENDED_PROTEIN_ALPHABET,
};

#[derive(Clone, Default)]
pub struct Processor {
    local_count: [u64; 2],
    global_count: Arc<Mutex<[u64; 2]>>,
    worker_id: Option<usize>,
}
impl Processor {
    pub fn final_counts(&self) -> [u64; 2] {
        let mut counts = [0; 2];
        let guard = self.global_count.lock().unwrap();
        counts.copy_from_slice(&*guard);
        counts
    }
}
impl ParallelProcessor for Processor {
    fn process_record(&mut self, record: SequenceRecord) -> seqshard::Result<()> {
        self.local_count[0] += 1;
        self.local_count[1] += record.encoded.len() as u64;
        Ok(())
    }
    fn on_worker_complete(&mut self) -> seqshard::Result<()> {
        let mut guard = self.global_count.lock().unwrap();
        guard[0] += self.local_count[0];
        guard[1] += self.local_count[1];
        self.local_count = [0; 2];
        Ok(())
    }
    fn set_worker_id(&mut self, worker_id: usize) {
        self.worker_id = Some(worker_id);
    }
    fn worker_id(&self) -> Option<usize> {
        self.worker_id
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration
    let num_records = 200_000;
    let filename = "synthetic_proteins.fa";

    println!("Parallel Shard Processing");
    println!("=========================");
    println!("Records: {}\n", num_records);

    // ========== GENERATE ==========
    println!("Generating...");
    let write_start = Instant::now();

    {
        let alphabet: Vec<char> = EXTENDED_PROTEIN_ALPHABET.chars().collect();
        let mut rng = SmallRng::seed_from_u64(42);
        let file = File::create(filename)?;
        let mut writer = BufWriter::with_capacity(4 * 1024 * 1024, file);

        for i in 0..num_records {
            let len = rng.random_range(30..90);
            let residues: String = (0..len)
                .map(|_| alphabet[rng.random_range(0..alphabet.len())])
                .collect();
            writeln!(writer, ">synth{:07}\n{}", i, residues)?;
        }
        writer.flush()?;
    }

    let write_duration = write_start.elapsed();
    println!("  Generated in {:.2}s\n", write_duration.as_secs_f64());

    // ========== PARALLEL PROCESS ==========
    println!("Processing...");
    let proc = Processor::default();
    let dataset = SequenceDataset::new(filename);

    let start = Instant::now();
    dataset.process_parallel(proc.clone(), 0)?; // 0 = use all available cores
    let proc_elapsed = start.elapsed();

    let [records, residues] = proc.final_counts();
    println!("  Records: {}", records);
    println!("  Residues: {}", residues);
    println!(
        "  Processing duration: {:.5}s",
        proc_elapsed.as_millis() as f64 / 1000.0
    );
    println!(
        "  Rate: {:.2} M records/s",
        records as f64 / proc_elapsed.as_secs_f64() / 1_000_000.0
    );

    Ok(())
}
