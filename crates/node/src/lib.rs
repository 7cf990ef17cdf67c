//! Node state machine.
//!
//! This crate composes the Synod protocol state with the fault model
//! (crash gate and silence) and the driver signals into the single
//! [`StateMachine`](synod_core::StateMachine) a runner drives.

mod state;

pub use state::NodeStateMachine;
