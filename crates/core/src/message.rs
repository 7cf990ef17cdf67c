//! Outbound message types for network communication.

use crate::Event;
use synod_messages::{
    AbortResponse, AckResponse, DecideAnnouncement, GatherResponse, ImposeRequest,
    NetworkMessage, ReadRequest,
};
use synod_types::ProcessId;

/// Outbound network messages.
///
/// These are the messages that a node can send to other nodes.
/// The runner handles the actual delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Open a round.
    Read(ReadRequest),

    /// Answer a read with the current estimate.
    Gather(GatherResponse),

    /// Ask peers to accept a value.
    Impose(ImposeRequest),

    /// Accept an imposed value.
    Ack(AckResponse),

    /// Reject a stale request.
    Abort(AbortResponse),

    /// Announce a decided value.
    Decide(DecideAnnouncement),
}

impl OutboundMessage {
    /// Get a human-readable name for this message type.
    pub fn type_name(&self) -> &'static str {
        match self {
            OutboundMessage::Read(_) => ReadRequest::message_type_id(),
            OutboundMessage::Gather(_) => GatherResponse::message_type_id(),
            OutboundMessage::Impose(_) => ImposeRequest::message_type_id(),
            OutboundMessage::Ack(_) => AckResponse::message_type_id(),
            OutboundMessage::Abort(_) => AbortResponse::message_type_id(),
            OutboundMessage::Decide(_) => DecideAnnouncement::message_type_id(),
        }
    }

    /// Check if this is an abort.
    pub fn is_abort(&self) -> bool {
        matches!(self, OutboundMessage::Abort(_))
    }

    /// Check if this is a decide announcement.
    pub fn is_decide(&self) -> bool {
        matches!(self, OutboundMessage::Decide(_))
    }

    /// Convert into the event the receiving node sees.
    pub fn into_event(self, from: ProcessId) -> Event {
        match self {
            OutboundMessage::Read(read) => Event::ReadReceived { from, read },
            OutboundMessage::Gather(gather) => Event::GatherReceived { from, gather },
            OutboundMessage::Impose(impose) => Event::ImposeReceived { from, impose },
            OutboundMessage::Ack(ack) => Event::AckReceived { from, ack },
            OutboundMessage::Abort(abort) => Event::AbortReceived { from, abort },
            OutboundMessage::Decide(decide) => Event::DecideReceived { from, decide },
        }
    }
}
