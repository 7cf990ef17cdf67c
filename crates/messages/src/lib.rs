//! Network messages for the Synod protocol.
//!
//! Every message a node can put on the wire lives here. Control signals
//! from the driver (directory, launch, crash, hold, start clock) are not
//! network messages; they only exist as events.

pub mod gossip;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use gossip::DecideAnnouncement;
pub use request::{ImposeRequest, ReadRequest};
pub use response::{AbortResponse, AckResponse, GatherResponse};

/// A message that can be sent between nodes.
pub trait NetworkMessage {
    /// Stable identifier of the message type, used for logging and routing.
    fn message_type_id() -> &'static str;
}

