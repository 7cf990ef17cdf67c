//! Synod Local Cluster
//!
//! Runs every node of a single-decree Synod cluster as a tokio task in one
//! process and reports what they decided.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: 3 nodes, 1 fault-prone
//! synod-cluster
//!
//! # Start with configuration file
//! synod-cluster --config cluster.toml
//!
//! # Override individual settings
//! synod-cluster --config cluster.toml --nodes 7 --faulty 3 --seed 42
//! ```
//!
//! See `ClusterConfig` for the configuration file format.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use synod_production::{init_logging, init_logging_with, ClusterConfig, LocalCluster};
use tracing::info;

/// Synod Local Cluster
///
/// Runs an in-process cluster through the crash-and-hold experiment.
#[derive(Parser, Debug)]
#[command(name = "synod-cluster")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of nodes (overrides config)
    #[arg(short, long)]
    nodes: Option<usize>,

    /// Number of fault-prone nodes (overrides config)
    #[arg(short, long)]
    faulty: Option<usize>,

    /// Decision window in milliseconds (overrides config)
    #[arg(long)]
    window_ms: Option<u64>,

    /// Observation window in milliseconds (overrides config)
    #[arg(long)]
    observe_ms: Option<u64>,

    /// Per-event crash probability of fault-prone nodes (overrides config)
    #[arg(long)]
    crash_probability: Option<f64>,

    /// Retry timer period in milliseconds (overrides config)
    #[arg(long)]
    retry_ms: Option<u64>,

    /// Random seed (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Log level filter (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut ClusterConfig) {
        if let Some(nodes) = self.nodes {
            config.nodes = nodes;
        }
        if let Some(faulty) = self.faulty {
            config.faulty = faulty;
        }
        if let Some(window_ms) = self.window_ms {
            config.decision_window_ms = window_ms;
        }
        if let Some(observe_ms) = self.observe_ms {
            config.observation_window_ms = observe_ms;
        }
        if let Some(p) = self.crash_probability {
            config.protocol.crash_probability = p;
        }
        if let Some(retry_ms) = self.retry_ms {
            config.protocol.retry_interval_ms = retry_ms;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.log_level {
        Some(filter) => init_logging_with(filter)?,
        None => init_logging()?,
    }

    let mut config = match &cli.config {
        Some(path) => ClusterConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ClusterConfig::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid cluster configuration")?;

    info!(
        nodes = config.nodes,
        faulty = config.faulty,
        decision_window_ms = config.decision_window_ms,
        observation_window_ms = config.observation_window_ms,
        "Cluster configuration loaded"
    );

    let cluster = LocalCluster::spawn(config).context("Failed to spawn cluster")?;
    let report = cluster.run_experiment().await?;
    report.print_summary();

    if !report.agreement() {
        bail!("Nodes decided different values: {:?}", report.decided_values());
    }
    Ok(())
}
