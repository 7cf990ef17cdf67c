//! Synod consensus state machine.
//!
//! This crate provides the synchronous per-node protocol core that is
//! driven identically by the simulation and the production runner.
//!
//! # Architecture
//!
//! A round is opened by a proposer and runs in two phases:
//!
//! - `propose` → broadcast `Read(ballot)`
//! - `Event::ReadReceived` → promise the ballot and reply `Gather`, or `Abort`
//! - `Event::GatherReceived` → on a majority, adopt the highest estimate and
//!   broadcast `Impose(ballot, value)`
//! - `Event::ImposeReceived` → accept the value and reply `Ack`, or `Abort`
//! - `Event::AckReceived` → on a majority, broadcast `Decide(value)`
//! - `Event::DecideReceived` → decide and relay once
//! - `Event::AbortReceived` → stop driving the round until the retry timer
//!
//! All I/O is performed by the runner via returned `Action`s.

mod config;
mod gather_set;
mod state;

pub use config::SynodConfig;
pub use gather_set::{GatherEntry, GatherSet};
pub use state::{Decision, SynodState};
