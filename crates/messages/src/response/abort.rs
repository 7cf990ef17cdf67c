//! Abort response.

use crate::NetworkMessage;
use serde::{Deserialize, Serialize};
use synod_types::Ballot;

/// Reply to a read or impose carrying a ballot the peer has already moved
/// past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortResponse {
    /// The rejected ballot.
    pub ballot: Ballot,
}

impl AbortResponse {
    /// Create a new abort.
    pub fn new(ballot: Ballot) -> Self {
        Self { ballot }
    }
}

impl NetworkMessage for AbortResponse {
    fn message_type_id() -> &'static str {
        "synod.abort"
    }
}
