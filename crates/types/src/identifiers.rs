//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process identifier.
///
/// Identities are 1-based (`1..=N`); the directory slot of a process is
/// `id - 1`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProcessId(pub u32);

impl ProcessId {
    /// Build the identity of the process occupying a directory slot.
    pub fn from_index(index: usize) -> Self {
        ProcessId(index as u32 + 1)
    }

    /// Directory slot of this process.
    ///
    /// # Panics
    ///
    /// Panics on `ProcessId(0)`, which is never a valid identity.
    pub fn index(self) -> usize {
        assert!(self.0 > 0, "ProcessId is 1-based");
        (self.0 - 1) as usize
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Ballot number.
///
/// Each process owns one residue class modulo `N`: process `id` starts at
/// `id - N` (negative, so never mistaken for an accepted round) and advances
/// by `N` for every new proposal. Ballots of different processes therefore
/// never collide, and the ballots of one process are strictly increasing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Ballot(pub i64);

impl Ballot {
    /// The ballot every process starts its read ballot at.
    pub const ZERO: Self = Ballot(0);

    /// Initial ballot of process `id` in a system of `n` processes.
    pub fn initial(id: ProcessId, n: usize) -> Self {
        Ballot(id.0 as i64 - n as i64)
    }

    /// The ballot below every ballot a process can ever hold.
    pub fn floor(n: usize) -> Self {
        Ballot(-2 * n as i64)
    }

    /// Next ballot in the same residue class.
    pub fn next(self, n: usize) -> Self {
        Ballot(self.0 + n as i64)
    }

    /// Whether this ballot was produced by an actual proposal round.
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Get the raw value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// A proposable value.
///
/// The default experiment only ever proposes `0` or `1`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Value(pub u64);

impl Value {
    pub const ZERO: Self = Value(0);
    pub const ONE: Self = Value(1);

    /// Get the raw value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_index_roundtrip() {
        assert_eq!(ProcessId(1).index(), 0);
        assert_eq!(ProcessId(3).index(), 2);
        assert_eq!(ProcessId::from_index(4), ProcessId(5));
    }

    #[test]
    fn test_initial_ballots_are_negative_and_distinct() {
        let n = 3;
        let ballots: Vec<Ballot> = (1..=n as u32)
            .map(|id| Ballot::initial(ProcessId(id), n))
            .collect();
        assert_eq!(ballots, vec![Ballot(-2), Ballot(-1), Ballot(0)]);
        assert!(ballots.iter().all(|b| !b.is_positive()));
    }

    #[test]
    fn test_ballots_stay_in_residue_class() {
        let n = 5;
        let mut b = Ballot::initial(ProcessId(2), n);
        for _ in 0..10 {
            let next = b.next(n);
            assert!(next > b);
            assert_eq!((next.0 - b.0), n as i64);
            assert_eq!(next.0.rem_euclid(n as i64), 2);
            b = next;
        }
    }

    #[test]
    fn test_floor_is_below_every_initial_ballot() {
        let n = 4;
        for id in 1..=n as u32 {
            assert!(Ballot::floor(n) < Ballot::initial(ProcessId(id), n));
        }
    }
}
