//! Read request (first phase of a round).

use crate::NetworkMessage;
use serde::{Deserialize, Serialize};
use synod_types::Ballot;

/// Ask a peer to promise not to accept anything below `ballot`, and to
/// report what it has accepted so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRequest {
    /// Ballot of the round being opened.
    pub ballot: Ballot,
}

impl ReadRequest {
    /// Create a new read request.
    pub fn new(ballot: Ballot) -> Self {
        Self { ballot }
    }
}

impl NetworkMessage for ReadRequest {
    fn message_type_id() -> &'static str {
        "synod.read"
    }
}
