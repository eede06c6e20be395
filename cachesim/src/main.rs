use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, error, info, warn, Level};

use cachelib::config::SimulationConfig;
use cachelib::relabel::{relabel_directory, DEFAULT_LABEL};
use cachelib::simulator::Simulator;
use cachelib::trace::{check_field_count, TraceSource, MSR_FIELD_COUNT, TRACE_FIELD_COUNT};
use cachelib::util::expand_trace_paths;
use cachelib::workload::WorkloadSummary;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Estimates the read latency of a storage trace under LRU and frequent read caching"))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log at debug level
    #[arg(short, long, global = true, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a trace against every configured cache
    Simulate(SimulateArgs),
    /// Print read/write counts and volumes for traces
    Stats(StatsArgs),
    /// Append a label column to every line of every .csv file in a directory
    Relabel(RelabelArgs),
}

#[derive(Args, Debug)]
struct SimulateArgs {
    trace: PathBuf,

    /// JSON cache configuration, defaults to one LRU and one frequent read cache
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the capacity, in entries, of every cache
    #[arg(long)]
    capacity: Option<usize>,

    #[arg(long)]
    hit_cost: Option<f64>,

    #[arg(long)]
    miss_cost: Option<f64>,

    /// Override the number of reads between frequent read cache reconciliations
    #[arg(long)]
    reconcile_interval: Option<u64>,

    /// Number of comma separated fields a trace line must have
    #[arg(long, default_value_t = TRACE_FIELD_COUNT, value_parser = parse_field_count)]
    fields: usize,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Trace files, or directories of .csv traces
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Raw MSR traces have 7 fields, relabelled ones 8
    #[arg(long, default_value_t = MSR_FIELD_COUNT, value_parser = parse_field_count)]
    fields: usize,

    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct RelabelArgs {
    directory: PathBuf,

    #[arg(short, long, default_value_t = String::from(DEFAULT_LABEL))]
    label: String,
}

#[derive(Serialize)]
struct FileSummary<'a> {
    file: String,
    #[serde(flatten)]
    summary: &'a WorkloadSummary,
}

fn parse_field_count(value: &str) -> Result<usize, String> {
    let count: usize = value.parse().map_err(|e| format!("{e}"))?;
    check_field_count(count).map_err(|e| e.to_string())
}

/// Makes lost lines visible, a trace with the wrong field count otherwise reports nothing but zeros
fn report_skips(path: &Path, source: &TraceSource) {
    if source.skipped() > 0 {
        warn!(
            "Skipped {} malformed lines in {} ({} with the wrong field count, {} with invalid numbers)",
            source.skipped(),
            path.display(),
            source.skipped_field_count(),
            source.skipped_invalid()
        );
    }
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();
    #[cfg(debug_assertions)]
    if cli.debug {
        info!("Running the debug binary, debug logging is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
    }
    match cli.command {
        Command::Simulate(args) => simulate(args),
        Command::Stats(args) => stats(args),
        Command::Relabel(args) => relabel(args),
    }
}

fn simulate(args: SimulateArgs) -> Result<(), String> {
    let start = Instant::now();
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_path(path).map_err(|e| e.to_string())?,
        None => SimulationConfig::default(),
    };
    if let Some(capacity) = args.capacity {
        config = config.with_capacity(capacity);
    }
    if let Some(interval) = args.reconcile_interval {
        config = config.with_reconcile_interval(interval);
    }
    if let Some(cost) = args.hit_cost {
        config.latency.hit_cost = cost;
    }
    if let Some(cost) = args.miss_cost {
        config.latency.miss_cost = cost;
    }
    config.validate().map_err(|e| e.to_string())?;
    debug!("Parsed input configuration: {config:?}");

    // An unreadable trace degenerates to a run without reads rather than aborting
    let source = TraceSource::open(&args.trace, args.fields).unwrap_or_else(|e| {
        error!("Failed to open the trace: {e}");
        TraceSource::default()
    });
    report_skips(&args.trace, &source);

    let mut simulator = Simulator::new(&config);
    let result = simulator.simulate(source.records());
    if args.json {
        println!("{}", serde_json::to_string_pretty(result).map_err(|e| format!("Couldn't serialise the output {e}"))?);
    } else {
        for cache in &result.caches {
            println!("Average Read Latency ({}): {} us", cache.name, cache.average_latency);
        }
    }
    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    let resident = simulator.get_resident_counts();
    let formatted = config.caches
        .iter()
        .map(|c| c.name.clone())
        .zip(resident.iter())
        .map(|(name, count)| format!("{name}: {}", *count))
        .reduce(|a, b| format!("{a}, {b}"))
        .unwrap_or_default();
    debug!("Resident offsets by cache: ({formatted})");
    Ok(())
}

fn stats(args: StatsArgs) -> Result<(), String> {
    let files = expand_trace_paths(&args.paths).map_err(|e| e.to_string())?;
    let mut summaries = Vec::with_capacity(files.len());
    for file in files {
        let source = match TraceSource::open(&file, args.fields) {
            Ok(source) => source,
            Err(e) => {
                error!("Skipping {}: {e}", file.display());
                continue;
            }
        };
        report_skips(&file, &source);
        summaries.push((file, WorkloadSummary::from_records(source.records())));
    }
    if args.json {
        let out: Vec<FileSummary<'_>> = summaries
            .iter()
            .map(|(file, summary)| FileSummary { file: file.display().to_string(), summary })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out).map_err(|e| format!("Couldn't serialise the output {e}"))?);
        return Ok(());
    }
    for (file, summary) in &summaries {
        println!("File: {}", file.display());
        println!("Write Count (Millions): {}", summary.write_count_millions);
        println!("Read Count (Millions): {}", summary.read_count_millions);
        println!("Write Size (GB): {}", summary.write_size_gib);
        println!("Read Size (GB): {}", summary.read_size_gib);
        println!();
    }
    Ok(())
}

fn relabel(args: RelabelArgs) -> Result<(), String> {
    let reports = relabel_directory(&args.directory, &args.label).map_err(|e| e.to_string())?;
    for report in &reports {
        println!("{} -> {} ({} lines)", report.input.display(), report.output.display(), report.lines);
    }
    info!("Relabelled {} files", reports.len());
    Ok(())
}
