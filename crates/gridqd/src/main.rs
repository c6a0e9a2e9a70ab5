//! gridqd — the gridq controller daemon.
//!
//! Assembles a provider and a scheduler and drives the supervisory loop:
//! one reconcile call per interval, each returning the worker delta it
//! applied. The provider owns all job state; gridqd can be restarted at
//! any time and will reconcile against whatever the queue reports.
//!
//! # Usage
//!
//! ```text
//! gridqd run --cmd './worker.sh' --ntasks 16 --provider slurm --config gridq.toml
//! gridqd cost --provider slurm --workers 256
//! ```

mod config;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use crate::config::GridqConfig;

#[derive(Parser)]
#[command(name = "gridqd", about = "gridq worker-fleet controller")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile the worker pool on an interval until interrupted.
    Run(RunArgs),
    /// Print the provider's cost table for job sizes 1..=N.
    Cost(CostArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Command each worker executes.
    #[arg(long)]
    cmd: String,

    /// Desired concurrently active workers (defaults to max_workers).
    #[arg(long)]
    ntasks: Option<u32>,

    /// Path to a gridq.toml config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Provider tag, overriding the config file.
    #[arg(long)]
    provider: Option<String>,

    /// Worker ceiling, overriding the config file.
    #[arg(long)]
    max_workers: Option<u32>,

    /// Seconds between reconcile calls.
    #[arg(long, default_value = "10")]
    interval: u64,

    /// Reconcile once and exit.
    #[arg(long)]
    once: bool,

    /// Write a run report artifact to this path on exit.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Run report format (json, toml, jsonl).
    #[arg(long, default_value = "json")]
    report_format: String,
}

#[derive(Args)]
struct CostArgs {
    /// Path to a gridq.toml config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Provider tag, overriding the config file.
    #[arg(long)]
    provider: Option<String>,

    /// Largest job size to evaluate.
    #[arg(long, default_value = "16")]
    workers: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gridqd=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Cost(args) => cost_table(args).await,
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<GridqConfig> {
    match path {
        Some(path) => {
            let config = GridqConfig::from_file(path)?;
            info!(path = ?path, "config loaded");
            Ok(config)
        }
        None => Ok(GridqConfig::default()),
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_ref())?;

    let kind = args
        .provider
        .unwrap_or_else(|| config.provider.kind.clone());
    let provider = gridq_provider::create_provider(&kind, &config.provider_options()?)?;
    info!(provider = %kind, "provider initialized");

    let mut overrides = config.scheduler_overrides();
    if let Some(ceiling) = args.max_workers {
        overrides.insert("max_workers".to_string(), serde_json::json!(ceiling));
    }
    let scheduler =
        gridq_scheduler::create_scheduler(&config.scheduler.kind, provider.clone(), &overrides)?;
    info!(
        scheduler = %config.scheduler.kind,
        max_workers = scheduler.config().max_workers,
        "scheduler initialized"
    );

    let mut deltas: Vec<i64> = Vec::new();
    loop {
        let delta = scheduler.schedule(&args.cmd, args.ntasks).await?;
        let active = provider.workers(None).await?;
        info!(delta, active, "reconciled");
        deltas.push(delta);

        if args.once {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(args.interval)) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    if let Some(path) = &args.report {
        write_report(path, &args.report_format, &args.cmd, &kind, &deltas)?;
        info!(path = ?path, "run report written");
    }
    Ok(())
}

/// Persist a summary of the run through the artifact registry.
fn write_report(
    path: &PathBuf,
    format: &str,
    cmd: &str,
    provider: &str,
    deltas: &[i64],
) -> anyhow::Result<()> {
    let artifact = gridq_io::open_artifact(format, path)?;
    let spawned: i64 = deltas.iter().filter(|d| **d > 0).sum();
    let killed: i64 = -deltas.iter().filter(|d| **d < 0).sum::<i64>();
    artifact.write_value(&serde_json::json!({
        "cmd": cmd,
        "provider": provider,
        "cycles": deltas.len(),
        "deltas": deltas,
        "workers_spawned": spawned,
        "workers_killed": killed,
    }))?;
    Ok(())
}

async fn cost_table(args: CostArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_ref())?;
    let kind = args
        .provider
        .unwrap_or_else(|| config.provider.kind.clone());
    let provider = gridq_provider::create_provider(&kind, &config.provider_options()?)?;

    if args.workers == 0 {
        warn!("nothing to evaluate, --workers is 0");
        return Ok(());
    }
    println!("workers  cost");
    for n in 1..=args.workers {
        let cost = provider.cost(n).await?;
        println!("{n:>7}  {cost}");
    }
    Ok(())
}
