//! Point-to-point replies to a proposer.

mod abort;
mod ack;
mod gather;

pub use abort::AbortResponse;
pub use ack::AckResponse;
pub use gather::GatherResponse;
