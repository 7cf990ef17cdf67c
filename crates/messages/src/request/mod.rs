//! Requests a proposer broadcasts to every peer.

mod impose;
mod read;

pub use impose::ImposeRequest;
pub use read::ReadRequest;
