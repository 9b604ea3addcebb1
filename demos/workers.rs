use anyhow::Result;
use clap::Parser;
use seqshard::{Batches, CollateOptions, LabelTable, SequenceDataset, SequenceRecord, WorkerShard};

#[derive(Parser)]
struct Args {
    /// Input FASTA path (may be compressed)
    #[clap(required = true)]
    path: String,
    /// Optional label table (CSV)
    #[clap(long)]
    labels: Option<String>,
    /// Number of round-robin workers
    #[clap(long, default_value_t = 4)]
    workers: usize,
    /// Shuffle buffer capacity (0 disables shuffling)
    #[clap(long, default_value_t = 256)]
    shuffle: usize,
    /// Records per collated batch
    #[clap(long, default_value_t = 32)]
    batch_size: usize,
    /// Turn debugging information on (-v, -vv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    stderrlog::new()
        .verbosity(match args.verbose {
            0 => stderrlog::LogLevelNum::Warn,
            1 => stderrlog::LogLevelNum::Info,
            _ => stderrlog::LogLevelNum::Debug,
        })
        .init()?;

    let mut dataset = SequenceDataset::new(&args.path);
    if let Some(labels) = &args.labels {
        let table = LabelTable::from_path(labels)?;
        println!(
            "Label table: {} ids across {} classes",
            table.len(),
            table.encoder().len()
        );
        dataset = dataset.with_labels(table);
    }

    println!("Sharded Batch Walkthrough");
    println!("=========================");
    println!("Workers: {}", args.workers);
    println!("Shuffle capacity: {}", args.shuffle);
    println!("Batch size: {}\n", args.batch_size);

    let options = CollateOptions::default();
    let mut total_records = 0usize;
    let mut total_batches = 0usize;

    for worker_id in 0..args.workers {
        let shard = WorkerShard::new(worker_id, args.workers)?;
        let stream: Box<dyn Iterator<Item = seqshard::Result<SequenceRecord>>> =
            if args.shuffle > 0 {
                Box::new(dataset.shuffled_worker_iter(shard, args.shuffle)?)
            } else {
                Box::new(dataset.worker_iter(shard)?)
            };

        let mut records = 0usize;
        let mut batches = 0usize;
        let mut labeled = 0usize;
        for batch in Batches::new(stream, args.batch_size, options)? {
            let batch = batch?;
            records += batch.n_records();
            labeled += batch.labels.as_ref().map_or(0, Vec::len);
            batches += 1;
        }

        println!(
            "  worker {}: {} records in {} batches ({} labeled)",
            worker_id, records, batches, labeled
        );
        total_records += records;
        total_batches += batches;
    }

    println!(
        "\nTotal: {} records in {} batches",
        total_records, total_batches
    );
    println!("Skipped: {} invalid records", dataset.skipped());

    Ok(())
}
