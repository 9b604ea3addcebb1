use std::{
    fs::File,
    io::{BufWriter, Write},
    time::Instant,
};

use anyhow::Result;
use clap::Parser;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use seqshard::EXTENDED_PROTEIN_ALPHABET;

#[derive(Parser)]
struct Args {
    /// Output FASTA path
    #[clap(required = true)]
    path: String,
    /// Optional label table path (CSV)
    #[clap(long)]
    labels: Option<String>,
    /// Number of records to generate
    #[clap(long, default_value_t = 10_000)]
    records: usize,
    /// Number of distinct classes in the label table
    #[clap(long, default_value_t = 50)]
    classes: usize,
    /// Shortest generated sequence
    #[clap(long, default_value_t = 20)]
    min_len: usize,
    /// Longest generated sequence
    #[clap(long, default_value_t = 120)]
    max_len: usize,
    /// Fraction of records left out of the label table
    #[clap(long, default_value_t = 0.05)]
    unlabeled: f64,
    #[clap(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = if let Some(seed) = args.seed {
        SmallRng::seed_from_u64(seed)
    } else {
        SmallRng::from_os_rng()
    };

    let alphabet: Vec<char> = EXTENDED_PROTEIN_ALPHABET.chars().collect();
    let start = Instant::now();

    let mut fasta = BufWriter::new(File::create(&args.path)?);
    let mut labels = args
        .labels
        .as_ref()
        .map(File::create)
        .transpose()?
        .map(BufWriter::new);
    if let Some(writer) = labels.as_mut() {
        writeln!(writer, ",protein_id,eggnog_id")?;
    }

    let mut labeled = 0usize;
    for i in 0..args.records {
        let id = format!("synth{:08}", i);
        let len = rng.random_range(args.min_len..=args.max_len);
        let residues: String = (0..len)
            .map(|_| alphabet[rng.random_range(0..alphabet.len())])
            .collect();

        writeln!(fasta, ">{} synthetic", id)?;
        for chunk in residues.as_bytes().chunks(60) {
            fasta.write_all(chunk)?;
            fasta.write_all(b"\n")?;
        }

        if let Some(writer) = labels.as_mut() {
            if rng.random::<f64>() >= args.unlabeled {
                let class = rng.random_range(0..args.classes);
                writeln!(writer, "{},{},COG{:04}", labeled, id, class)?;
                labeled += 1;
            }
        }
    }
    fasta.flush()?;
    if let Some(writer) = labels.as_mut() {
        writer.flush()?;
    }
    let elapsed = start.elapsed();

    eprintln!("Finished generating {} records", args.records);
    if args.labels.is_some() {
        eprintln!("Labeled: {}", labeled);
    }
    eprintln!("Elapsed time: {:?}", elapsed);

    Ok(())
}
