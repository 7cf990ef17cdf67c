//! Core types for Synod consensus.
//!
//! This crate provides the foundational types for the node architecture:
//!
//! - [`Event`]: All possible inputs to a node
//! - [`Action`]: All possible outputs from a node
//! - [`EventPriority`]: Ordering priority for events at the same timestamp
//! - [`StateMachine`]: The trait every node implements
//!
//! # Architecture
//!
//! ```text
//! Events → StateMachine::handle() → Actions
//! ```
//!
//! The state machine is synchronous, deterministic and performs no I/O.
//! The runner (simulation or production) delivers events, executes the
//! returned actions, and turns outbound messages into events at the
//! receiving node.

mod action;
mod event;
mod message;
mod traits;

pub use action::Action;
pub use event::{Event, EventPriority};
pub use message::OutboundMessage;
pub use traits::StateMachine;

/// Timer identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerId {
    /// Periodic re-propose timer.
    Retry,
}

impl TimerId {
    /// The event delivered when this timer fires.
    pub fn event(self) -> Event {
        match self {
            TimerId::Retry => Event::RetryTimer,
        }
    }
}
