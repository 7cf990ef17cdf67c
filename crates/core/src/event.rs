//! Event types for the deterministic state machine.

use synod_messages::{
    AbortResponse, AckResponse, DecideAnnouncement, GatherResponse, ImposeRequest, ReadRequest,
};
use synod_types::{Directory, ProcessId, Value};
use std::time::Duration;

/// Priority levels for event ordering within the same timestamp.
///
/// Events at the same simulation time are processed in priority order.
/// Lower values = higher priority (processed first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum EventPriority {
    /// Timer events: scheduled by the node itself.
    Timer = 0,

    /// Network events: messages from other nodes.
    Network = 1,

    /// Control events: signals from the driver.
    Control = 2,
}

/// All possible events a node can receive.
///
/// Events are **passive data** - they describe something that happened.
/// The state machine processes events and returns actions.
#[derive(Debug, Clone)]
pub enum Event {
    // ═══════════════════════════════════════════════════════════════════════
    // Timers (priority: Timer)
    // ═══════════════════════════════════════════════════════════════════════
    /// Time to re-drive a stalled proposal.
    RetryTimer,

    // ═══════════════════════════════════════════════════════════════════════
    // Network Messages (priority: Network)
    // ═══════════════════════════════════════════════════════════════════════
    /// A proposer opened a round.
    ReadReceived { from: ProcessId, read: ReadRequest },

    /// A peer answered our read.
    GatherReceived {
        from: ProcessId,
        gather: GatherResponse,
    },

    /// A proposer asks us to accept a value.
    ImposeReceived {
        from: ProcessId,
        impose: ImposeRequest,
    },

    /// A peer accepted our value.
    AckReceived { from: ProcessId, ack: AckResponse },

    /// A peer rejected one of our requests.
    AbortReceived {
        from: ProcessId,
        abort: AbortResponse,
    },

    /// Some node saw a majority accept a value.
    DecideReceived {
        from: ProcessId,
        decide: DecideAnnouncement,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Driver Signals (priority: Control)
    // ═══════════════════════════════════════════════════════════════════════
    /// The list of every participant. Delivered once.
    DirectoryReceived { directory: Directory },

    /// Reference instant for decision latency, relative to the runner epoch.
    StartClock { at: Duration },

    /// Draw an initial value and propose it.
    LaunchReceived,

    /// Propose a specific value.
    ProposeRequested { value: Value },

    /// From now on every inbound event may crash the node.
    CrashSignal,

    /// Stop re-proposing from the retry timer.
    HoldSignal,
}

impl Event {
    /// Get the priority for this event type.
    pub fn priority(&self) -> EventPriority {
        match self {
            Event::RetryTimer => EventPriority::Timer,

            Event::ReadReceived { .. }
            | Event::GatherReceived { .. }
            | Event::ImposeReceived { .. }
            | Event::AckReceived { .. }
            | Event::AbortReceived { .. }
            | Event::DecideReceived { .. } => EventPriority::Network,

            Event::DirectoryReceived { .. }
            | Event::StartClock { .. }
            | Event::LaunchReceived
            | Event::ProposeRequested { .. }
            | Event::CrashSignal
            | Event::HoldSignal => EventPriority::Control,
        }
    }

    /// Get a human-readable name for this event type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::RetryTimer => "RetryTimer",
            Event::ReadReceived { .. } => "ReadReceived",
            Event::GatherReceived { .. } => "GatherReceived",
            Event::ImposeReceived { .. } => "ImposeReceived",
            Event::AckReceived { .. } => "AckReceived",
            Event::AbortReceived { .. } => "AbortReceived",
            Event::DecideReceived { .. } => "DecideReceived",
            Event::DirectoryReceived { .. } => "DirectoryReceived",
            Event::StartClock { .. } => "StartClock",
            Event::LaunchReceived => "LaunchReceived",
            Event::ProposeRequested { .. } => "ProposeRequested",
            Event::CrashSignal => "CrashSignal",
            Event::HoldSignal => "HoldSignal",
        }
    }

    /// Sender of a network message, if this is one.
    pub fn sender(&self) -> Option<ProcessId> {
        match self {
            Event::ReadReceived { from, .. }
            | Event::GatherReceived { from, .. }
            | Event::ImposeReceived { from, .. }
            | Event::AckReceived { from, .. }
            | Event::AbortReceived { from, .. }
            | Event::DecideReceived { from, .. } => Some(*from),
            _ => None,
        }
    }
}
