//! Core types for Synod consensus.
//!
//! - [`ProcessId`]: stable 1-based identity of a participant
//! - [`Ballot`]: round identifier ordering competing proposals
//! - [`Value`]: the thing being agreed on
//! - [`Directory`]: immutable, shared list of all participants

mod directory;
mod identifiers;

pub use directory::{has_majority, majority_threshold, Directory, DirectoryError};
pub use identifiers::{Ballot, ProcessId, Value};
