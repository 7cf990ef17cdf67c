//! Gather response.

use crate::NetworkMessage;
use serde::{Deserialize, Serialize};
use synod_types::{Ballot, Value};

/// Reply to a read: the last value this peer accepted and the ballot it
/// was accepted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatherResponse {
    /// Ballot of the read being answered.
    pub ballot: Ballot,
    /// Ballot under which `estimate` was accepted. Non-positive means the
    /// peer has not accepted anything yet.
    pub est_ballot: Ballot,
    /// Accepted value, if any.
    pub estimate: Option<Value>,
}

impl GatherResponse {
    /// Create a new gather response.
    pub fn new(ballot: Ballot, est_ballot: Ballot, estimate: Option<Value>) -> Self {
        Self {
            ballot,
            est_ballot,
            estimate,
        }
    }

    /// Whether the peer reported an actually accepted estimate.
    pub fn has_estimate(&self) -> bool {
        self.est_ballot.is_positive()
    }
}

impl NetworkMessage for GatherResponse {
    fn message_type_id() -> &'static str {
        "synod.gather"
    }
}
