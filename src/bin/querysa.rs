use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use sufidx::io::fasta_reader;
use sufidx::{QueryMode, QueryRecord, SuffixArrayIndex};

#[derive(Parser)]
#[command(name = "querysa")]
#[command(about = "Look up FASTA query patterns in a suffix-array index", long_about = None)]
#[command(version)]
struct Cli {
    /// Index file written by buildsa
    #[arg(value_name = "INDEX")]
    index: PathBuf,

    /// Query FASTA, one pattern per record
    #[arg(value_name = "QUERIES.FA")]
    queries: PathBuf,

    /// Comparison mode: naive or simpleaccel
    #[arg(value_name = "MODE")]
    mode: String,

    /// Per-query output file, or '+' to emit only the summary line
    #[arg(value_name = "OUTPUT")]
    output: String,

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
        log::error!("query run failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> sufidx::Result<()> {
    let mode: QueryMode = cli.mode.parse()?;

    let index = SuffixArrayIndex::load(&cli.index)?;
    let mut records = fasta_reader::read_queries(&cli.queries)?;
    log::info!(
        "answering {} queries against {} ({:?})",
        records.len(),
        cli.index.display(),
        mode
    );

    let start = Instant::now();
    index.batch(&mut records, mode);
    let elapsed = start.elapsed().as_secs_f64();

    let occurrences: usize = records.iter().map(|r| r.results.len()).sum();
    log::info!(
        "answered {} queries ({} occurrences) in {:.3}s",
        records.len(),
        occurrences,
        elapsed
    );

    if cli.output == "+" {
        println!("{}\t{}\t{:.3}", records.len(), occurrences, elapsed);
    } else {
        write_results(&records, &cli.output)?;
        log::info!("results written to {}", cli.output);
    }

    Ok(())
}

/// One line per query: `<title>\t<count>\t<pos_1>...\t<pos_count>`.
/// Positions are zero-based offsets into the normalized reference.
fn write_results(records: &[QueryRecord], path: &str) -> sufidx::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for record in records {
        write!(out, "{}\t{}", record.title, record.results.len())?;
        for pos in &record.results {
            write!(out, "\t{pos}")?;
        }
        writeln!(out)?;
    }
    out.flush()?;
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
