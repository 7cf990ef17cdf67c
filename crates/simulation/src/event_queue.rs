//! Ordering key for the simulation event queue.

use std::time::Duration;
use synod_core::{Event, EventPriority};
use synod_types::ProcessId;

/// Key of a scheduled event.
///
/// Field order defines the processing order: earlier time first, then
/// higher priority, then lower node id, then insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventKey {
    /// When the event fires.
    pub time: Duration,
    /// Priority of the event within the same instant.
    pub priority: EventPriority,
    /// Node the event is delivered to.
    pub node: ProcessId,
    /// Monotonic insertion counter, unique per runner.
    pub sequence: u64,
}

impl EventKey {
    /// Build the key for `event` delivered to `node` at `time`.
    pub fn new(time: Duration, event: &Event, node: ProcessId, sequence: u64) -> Self {
        Self {
            time,
            priority: event.priority(),
            node,
            sequence,
        }
    }
}
