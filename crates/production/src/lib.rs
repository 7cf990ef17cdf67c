//! Production runner.
//!
//! Drives [`NodeStateMachine`](synod_node::NodeStateMachine)s on tokio:
//! each node owns a mailbox drained by one task, timers are tokio sleep
//! tasks that post back into that mailbox, and sends are non-blocking
//! enqueues into peer mailboxes.
//!
//! ```text
//!   peers ──► mailbox ──► ProductionRunner ──► actions
//!                ▲              │                 │
//!                │              ▼                 ├── Broadcast/Send ──► peer mailboxes
//!                └──────── TimerManager ◄─────────┤
//!                                                 └── EmitDecision ──► decision sink
//! ```

mod cluster;
mod config;
mod runner;
mod telemetry;
mod timers;

pub use cluster::{ClusterReport, LocalCluster};
pub use config::{ClusterConfig, ProtocolConfig};
pub use runner::{DecisionNotice, Mailboxes, ProductionRunner, RunnerError, ShutdownHandle};
pub use telemetry::{init_logging, init_logging_with, TelemetryError};
pub use timers::TimerManager;
