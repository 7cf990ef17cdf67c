//! Action types for the deterministic state machine.

use crate::{message::OutboundMessage, TimerId};
use synod_types::{Ballot, ProcessId, Value};
use std::time::Duration;

/// Actions the state machine wants to perform.
///
/// Actions are **commands** - they describe something to do.
/// The runner executes actions; messages come back as events at the
/// receiving node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ═══════════════════════════════════════════════════════════════════════
    // Network
    // ═══════════════════════════════════════════════════════════════════════
    /// Send a message to every process in the directory, the sender included.
    Broadcast { message: OutboundMessage },

    /// Send a message to a single process.
    Send {
        to: ProcessId,
        message: OutboundMessage,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Timers
    // ═══════════════════════════════════════════════════════════════════════
    /// Set a timer to fire after a duration.
    ///
    /// Setting a timer that is already pending replaces it.
    SetTimer { id: TimerId, duration: Duration },

    // ═══════════════════════════════════════════════════════════════════════
    // External Notifications
    // ═══════════════════════════════════════════════════════════════════════
    /// The node decided.
    ///
    /// `ballot` is the node's own ballot when the decision arrived and
    /// `latency` is measured from the driver's start clock.
    EmitDecision {
        value: Value,
        ballot: Ballot,
        latency: Duration,
    },
}

impl Action {
    /// Get a human-readable name for this action type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::Broadcast { .. } => "Broadcast",
            Action::Send { .. } => "Send",
            Action::SetTimer { .. } => "SetTimer",
            Action::EmitDecision { .. } => "EmitDecision",
        }
    }

    /// The message carried by a network action.
    pub fn message(&self) -> Option<&OutboundMessage> {
        match self {
            Action::Broadcast { message } | Action::Send { message, .. } => Some(message),
            _ => None,
        }
    }
}
