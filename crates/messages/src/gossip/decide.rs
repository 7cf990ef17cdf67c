//! Decide announcement.

use crate::NetworkMessage;
use serde::{Deserialize, Serialize};
use synod_types::Value;

/// A majority accepted `value`. Every node relays the first one it sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecideAnnouncement {
    /// The decided value.
    pub value: Value,
}

impl DecideAnnouncement {
    /// Create a new decide announcement.
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl NetworkMessage for DecideAnnouncement {
    fn message_type_id() -> &'static str {
        "synod.decide"
    }
}
