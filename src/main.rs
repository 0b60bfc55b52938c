use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pvs_core::engine::bench;
use pvs_core::engine::config::EngineConfig;
use pvs_core::engine::driver::RootDriver;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_FEN: &str = "rn1qkbnr/pp2pppp/2p5/3pPb2/3P4/8/PPP2PPP/RNBQKBNR w KQkq - 0 22";

#[derive(Parser)]
#[command(name = "chess-pvs")]
#[command(about = "Root-split principal variation search for chess", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search every root move of a position and report the best one
    Analyze {
        /// Position to analyze
        #[arg(short, long, default_value = DEFAULT_FEN)]
        fen: String,

        /// Search depth in plies
        #[arg(short, long, default_value_t = 7)]
        depth: i32,

        /// Number of root moves searched concurrently
        #[arg(short, long)]
        workers: Option<usize>,

        /// JSON engine configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Disable pruning and the shared root bound
        #[arg(long)]
        strict: bool,
    },
    /// Measure evaluator and move generator throughput
    Bench {
        /// Time spent on each measurement
        #[arg(long, default_value_t = 1000)]
        millis: u64,
    },
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    EngineConfig::load_from_json(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn analyze(
    fen: &str,
    depth: i32,
    workers: Option<usize>,
    config: Option<&Path>,
    strict: bool,
) -> Result<()> {
    let mut config = load_config(config)?;
    if strict {
        config.static_null_pruning = false;
        config.null_move_pruning = false;
        config.shared_bounds = false;
    }
    if let Some(workers) = workers {
        config.workers = workers.max(1);
    }
    tracing::info!(fen, depth, workers = config.workers, strict, "analyzing");

    let analysis = RootDriver::new(config)
        .analyze_fen(fen, depth)
        .context("search failed")?;

    println!("{}", analysis.table());
    println!();
    match (analysis.best_label(), analysis.best_score) {
        (Some(label), Some(score)) => println!("best move {label} ({score})"),
        _ => println!("no legal moves"),
    }
    println!("{}", analysis.summary_line());
    Ok(())
}

fn run_bench(millis: u64) -> Result<()> {
    let config = Arc::new(EngineConfig::default());
    let report = bench::run(&config, Duration::from_millis(millis))?;
    println!("{report}");
    Ok(())
}

fn main() -> Result<()> {
    // initialize tracing; `log` records from the engine are bridged in
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Analyze {
            fen,
            depth,
            workers,
            config,
            strict,
        } => analyze(&fen, depth, workers, config.as_deref(), strict),
        Command::Bench { millis } => run_bench(millis),
    }
}
