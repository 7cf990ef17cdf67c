//! Ack response.

use crate::NetworkMessage;
use serde::{Deserialize, Serialize};
use synod_types::Ballot;

/// Reply to an impose: the value was accepted under `ballot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    pub ballot: Ballot,
}

impl AckResponse {
    /// Create a new ack.
    pub fn new(ballot: Ballot) -> Self {
        Self { ballot }
    }
}

impl NetworkMessage for AckResponse {
    fn message_type_id() -> &'static str {
        "synod.ack"
    }
}
