use clap::Parser;
use std::path::PathBuf;

use sufidx::io::fasta_reader;
use sufidx::SuffixArrayIndex;

#[derive(Parser)]
#[command(name = "buildsa")]
#[command(about = "Build a suffix-array index over a FASTA reference", long_about = None)]
#[command(version)]
struct Cli {
    /// Input reference FASTA (.fa, optionally gzip/BGZF compressed)
    #[arg(value_name = "REF.FA")]
    reference: PathBuf,

    /// Output index file
    #[arg(value_name = "INDEX")]
    output: PathBuf,

    /// Also build a prefix table over all prefixes of length K (0 = none)
    #[arg(long, value_name = "K", default_value = "0")]
    preftab: usize,

    /// Seed for the normalizer's replacement of non-DNA bytes
    /// (default: entropy-seeded, not reproducible)
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Number of threads (default: all available cores)
    #[arg(short = 't', long, value_name = "INT")]
    threads: Option<usize>,
}

fn main() {
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        std::process::exit(if e.use_stderr() { 1 } else { 0 });
    });

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .format_target(false)
        .init();

    configure_thread_pool(cli.threads);

    if let Err(e) = run(&cli) {
        log::error!("index building failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> sufidx::Result<()> {
    log::info!("building index for reference: {}", cli.reference.display());

    let raw = fasta_reader::read_reference(&cli.reference)?;
    log::info!("reference length: {} bases", raw.len());

    let index = match cli.seed {
        Some(seed) => SuffixArrayIndex::from_reference_seeded(&raw, cli.preftab, seed)?,
        None => SuffixArrayIndex::from_reference(&raw, cli.preftab)?,
    };

    index.save(&cli.output)?;
    log::info!("index written to {}", cli.output.display());
    Ok(())
}

fn configure_thread_pool(threads: Option<usize>) {
    let num_threads = threads.unwrap_or_else(num_cpus::get).max(1);

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        log::warn!("failed to configure thread pool: {e} (may already be initialized)");
    } else {
        log::debug!("rayon thread pool configured with {num_threads} threads");
    }
}
