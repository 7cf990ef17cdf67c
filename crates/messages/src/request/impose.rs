//! Impose request (second phase of a round).

use crate::NetworkMessage;
use serde::{Deserialize, Serialize};
use synod_types::{Ballot, Value};

/// Ask a peer to accept `value` under `ballot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImposeRequest {
    /// Ballot the read phase was won with.
    pub ballot: Ballot,
    /// Value to accept.
    pub value: Value,
}

impl ImposeRequest {
    /// Create a new impose request.
    pub fn new(ballot: Ballot, value: Value) -> Self {
        Self { ballot, value }
    }
}

impl NetworkMessage for ImposeRequest {
    fn message_type_id() -> &'static str {
        "synod.impose"
    }
}
