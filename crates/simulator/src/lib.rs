//! Synod Simulator
//!
//! Runs the crash-and-hold experiment on the deterministic simulation
//! framework.
//!
//! # Architecture
//!
//! The simulator builds on `synod-simulation` to provide:
//!
//! - **Configuration**: node count, faulty count, windows and protocol knobs,
//!   validated up front
//! - **Experiment**: distributes the directory, crashes a random subset,
//!   launches every node, then holds all but one leader
//! - **Report**: decisions, agreement check, message statistics
//!
//! # Example
//!
//! ```ignore
//! use synod_simulator::{Experiment, ExperimentConfig};
//!
//! let config = ExperimentConfig::new(3, 1).with_seed(12345);
//! let report = Experiment::new(config)?.run();
//!
//! assert!(report.agreement());
//! report.print_summary();
//! ```

pub mod config;
pub mod report;
pub mod runner;

pub use config::{ConfigError, ExperimentConfig};
pub use report::ExperimentReport;
pub use runner::Experiment;
