//! Peer directory and majority arithmetic.

use crate::ProcessId;
use std::sync::Arc;

/// Check whether `count` responses form a majority of `n` participants.
///
/// Uses the integer threshold `n / 2`: a majority is anything strictly
/// above it (2 of 3, 3 of 5, 3 of 4).
pub fn has_majority(count: usize, n: usize) -> bool {
    count > n / 2
}

/// Smallest number of responses that forms a majority of `n`.
pub fn majority_threshold(n: usize) -> usize {
    n / 2 + 1
}

/// Errors that can occur when building a directory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// A directory must contain at least one process.
    #[error("directory is empty")]
    Empty,

    /// Slot `index` must hold `ProcessId(index + 1)`.
    #[error("slot {index} holds {found}, expected {expected}")]
    Misplaced {
        index: usize,
        found: ProcessId,
        expected: ProcessId,
    },
}

/// Immutable list of every participant, ordered by slot.
///
/// Built once by the driver and handed to every node. Cloning shares the
/// underlying list. The list includes the receiving node itself, so a
/// broadcast reaches the sender too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    peers: Arc<[ProcessId]>,
}

impl Directory {
    /// Create a directory from an ordered peer list.
    pub fn new(peers: Vec<ProcessId>) -> Result<Self, DirectoryError> {
        if peers.is_empty() {
            return Err(DirectoryError::Empty);
        }
        for (index, &found) in peers.iter().enumerate() {
            let expected = ProcessId::from_index(index);
            if found != expected {
                return Err(DirectoryError::Misplaced {
                    index,
                    found,
                    expected,
                });
            }
        }
        Ok(Self {
            peers: peers.into(),
        })
    }

    /// Directory of `n` processes with identities `1..=n`.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn with_size(n: usize) -> Self {
        assert!(n > 0, "directory needs at least one process");
        Self {
            peers: (0..n).map(ProcessId::from_index).collect(),
        }
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Always false; an empty directory cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Process at a slot.
    pub fn get(&self, index: usize) -> Option<ProcessId> {
        self.peers.get(index).copied()
    }

    /// Check if a process is listed.
    pub fn contains(&self, id: ProcessId) -> bool {
        id.0 >= 1 && self.get(id.index()) == Some(id)
    }

    /// Iterate over all participants in slot order.
    pub fn iter(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.peers.iter().copied()
    }
}
