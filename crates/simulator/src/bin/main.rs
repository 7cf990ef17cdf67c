//! Synod Deterministic Simulator CLI
//!
//! Run the crash-and-hold experiment with configurable parameters.
//!
//! # Example
//!
//! ```bash
//! # Three nodes, one of them fault-prone
//! synod-sim --nodes 3 --faulty 1
//!
//! # Larger system, slower network, certain crashes
//! synod-sim -n 7 -f 3 --latency-ms 40 --crash-probability 1.0 --seed 7
//! ```

use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use synod_consensus::SynodConfig;
use synod_simulator::{Experiment, ExperimentConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Synod Deterministic Simulator
///
/// Runs the crash-and-hold experiment in a fully deterministic environment.
/// Given the same seed, produces identical results every run.
#[derive(Parser, Debug)]
#[command(name = "synod-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of nodes
    #[arg(short = 'n', long, default_value = "3")]
    nodes: usize,

    /// Number of fault-prone nodes (must be below nodes/2)
    #[arg(short = 'f', long, default_value = "1")]
    faulty: usize,

    /// Decision window in milliseconds
    #[arg(long, default_value = "1000")]
    window_ms: u64,

    /// Observation window after the leader is chosen, in milliseconds
    #[arg(long, default_value = "5000")]
    observe_ms: u64,

    /// Per-event crash probability of fault-prone nodes
    #[arg(long, default_value = "0.2")]
    crash_probability: f64,

    /// Retry timer period in milliseconds
    #[arg(long, default_value = "50")]
    retry_ms: u64,

    /// Base network latency in milliseconds
    #[arg(long, default_value = "10")]
    latency_ms: u64,

    /// Random seed for deterministic simulation
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,synod_simulator=info")),
        )
        .init();

    let args = Args::parse();

    info!(
        nodes = args.nodes,
        faulty = args.faulty,
        window_ms = args.window_ms,
        observe_ms = args.observe_ms,
        seed = args.seed,
        "Starting experiment"
    );

    let mut synod = SynodConfig::default().with_retry_interval(Duration::from_millis(args.retry_ms));
    synod.crash_probability = args.crash_probability;

    let config = ExperimentConfig::new(args.nodes, args.faulty)
        .with_decision_window(Duration::from_millis(args.window_ms))
        .with_observation_window(Duration::from_millis(args.observe_ms))
        .with_latency(Duration::from_millis(args.latency_ms))
        .with_synod(synod)
        .with_seed(args.seed);

    let experiment = match Experiment::new(config) {
        Ok(experiment) => experiment,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };

    let report = experiment.run();
    report.print_summary();

    if report.agreement() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
