use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossbeam_channel::unbounded;
use log::{error, info, warn, LevelFilter};

use ptsb_sorter::analysis::report::RunReport;
use ptsb_sorter::core::config::SorterConfig;
use ptsb_sorter::core::domain::BondPair;
use ptsb_sorter::pipeline::sorter::Sorter;
use ptsb_sorter::pipeline::{RunStats, SortEvent};

// --- CLI Definitions ---

#[derive(Parser, Debug)]
#[command(author, version, about = "Sort reactive trajectories into r2r / r2p1 / r2p2 / p2p buckets", long_about = None)]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reaction name (input folder unless --input-dir is given)
    #[arg(short, long)]
    reaction: Option<String>,

    /// Directory holding the input trajectories
    #[arg(short, long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Directory the outcome buckets are created in
    #[arg(short, long, value_name = "DIR")]
    output_root: Option<PathBuf>,

    /// Tracked bond as 1-based atom indices, e.g. 16-62 (repeat three times)
    #[arg(short, long = "bond", value_name = "I-J")]
    bonds: Vec<BondPair>,

    /// Distance (Å) above which a bond counts as broken
    #[arg(long)]
    break_threshold: Option<f64>,

    /// Distance (Å) below which a bond counts as formed
    #[arg(long)]
    formation_threshold: Option<f64>,

    /// Regex input file names must match
    #[arg(long, value_name = "REGEX")]
    pattern: Option<String>,

    /// Number of worker threads (0 = one per core)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Keep a short trailing frame instead of rejecting the file
    #[arg(long)]
    allow_truncated: bool,

    /// Write a run manifest (.json or .csv)
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Exit non-zero if any trajectory could not be sorted
    #[arg(long)]
    fail_on_error: bool,

    /// More log output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

// --- Initialization Helpers ---

fn init_logging(args: &Args) {
    let level = if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .format_timestamp(None)
        .init();
}

fn build_config(args: &Args) -> Result<SorterConfig> {
    let mut config = match &args.config {
        Some(path) => SorterConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SorterConfig::default(),
    };

    if let Some(reaction) = &args.reaction {
        config.reaction = reaction.clone();
    }
    if let Some(dir) = &args.input_dir {
        config.input_dir = Some(dir.clone());
    }
    if let Some(root) = &args.output_root {
        config.output_root = root.clone();
    }
    if !args.bonds.is_empty() {
        config.bonds = args.bonds.clone();
    }
    if let Some(t) = args.break_threshold {
        config.break_threshold = t;
    }
    if let Some(t) = args.formation_threshold {
        config.formation_threshold = t;
    }
    if let Some(p) = &args.pattern {
        config.file_pattern = p.clone();
    }
    if let Some(n) = args.threads {
        config.threads = n;
    }
    if args.allow_truncated {
        config.allow_truncated = true;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

// --- Main ---

fn run(args: Args) -> Result<ExitCode> {
    let config = build_config(&args)?;

    if args.dump_config {
        println!("{}", config.to_json()?);
        return Ok(ExitCode::SUCCESS);
    }

    let input_dir = config.input_dir();
    let bonds: Vec<String> = config.bonds.iter().map(|b| b.to_string()).collect();
    info!(
        "Reaction '{}': bonds [{}], break > {} Å, formation < {} Å",
        config.reaction,
        bonds.join(", "),
        config.break_threshold,
        config.formation_threshold
    );

    let sorter = Arc::new(Sorter::new(config.clone()));
    sorter
        .prepare_output_dirs()
        .context("Failed to create output directories")?;

    let inputs = sorter
        .discover_inputs()
        .with_context(|| format!("Failed to list {}", input_dir.display()))?;
    if inputs.is_empty() {
        warn!("No trajectories matching '{}' in {}", config.file_pattern, input_dir.display());
    }

    let (tx, rx) = unbounded();
    let worker_sorter = sorter.clone();
    let worker = thread::Builder::new()
        .name("Sort-Worker".to_string())
        .spawn(move || worker_sorter.run(&inputs, tx))?;

    let mut stats = RunStats::new();
    let mut report = RunReport::new(&config);

    for event in rx {
        match &event {
            SortEvent::Classified(o) => info!(
                "[{}] {} -> {} ({}, {} segment reversed)",
                o.index,
                o.input.display(),
                o.output.display(),
                o.classification.category,
                if o.classification.reverse_first { "first" } else { "second" }
            ),
            SortEvent::Failed { index, failure } => error!("[{}] {}", index, failure),
            SortEvent::Started(_) | SortEvent::Finished => {}
        }
        stats.ingest(&event);
        report.record(&event);
    }

    match worker.join() {
        Ok(result) => result.context("Sorting run failed")?,
        Err(_) => bail!("Sort worker panicked"),
    }

    info!("Sorted {}/{} trajectories: {}", stats.classified, stats.queued, stats.summary());

    if let Some(path) = &args.report {
        report
            .write(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Run manifest written to {}", path.display());
    }

    if args.fail_on_error && stats.failed > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
