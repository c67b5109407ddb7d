use anyhow::{Context as _, Result};
use clap::Parser;
use csma_sim::{Scenario, run, write_timeline};
use std::{fs::File, io::BufWriter, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CSMA/CA simulator
///
/// Runs the scenario described in a TOML file and prints the throughput
/// of every transmitter. Runs are reproducible for a given seed.
#[derive(Parser, Debug)]
#[command(name = "csma-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Scenario file
    scenario: PathBuf,

    /// Random seed, overrides the scenario's. Defaults to 0.
    #[arg(long)]
    seed: Option<u64>,

    /// Log every station decision
    #[arg(long)]
    debug: bool,

    /// Write the stations' timelines to this CSV file
    #[arg(long)]
    timeline: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug {
        "warn,csma_core=debug,csma_sim=debug"
    } else {
        "warn,csma_core=info,csma_sim=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let scenario = Scenario::load(&args.scenario)?;
    let seed = args.seed.or(scenario.seed).unwrap_or_default();

    let outcome = run(&scenario, seed)?;
    println!("{}", outcome.summary);

    if let Some(path) = args.timeline {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_timeline(&outcome.report, BufWriter::new(file))
            .with_context(|| format!("Failed to write the timeline to {}", path.display()))?;
        info!(path = %path.display(), "timeline written");
    }

    Ok(())
}
