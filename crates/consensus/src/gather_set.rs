//! Per-round collection of gather replies.

use synod_types::{Ballot, Value};

/// An estimate reported by a peer during the read phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatherEntry {
    /// Value the peer accepted.
    pub estimate: Option<Value>,
    /// Ballot it was accepted under. Always positive for stored entries.
    pub est_ballot: Ballot,
}

/// Gather replies for the current round, one slot per directory index.
///
/// Only replies carrying a positive estimate ballot are stored. Replies from
/// peers that have not accepted anything yet only bump a counter; they count
/// towards the majority but can never be adopted.
#[derive(Debug, Clone)]
pub struct GatherSet {
    /// Positive entries by slot.
    slots: Vec<Option<GatherEntry>>,
    /// Which slots have replied this round (positive or not).
    responded: Vec<bool>,
    /// Replies with a non-positive estimate ballot.
    non_positive: usize,
}

impl GatherSet {
    /// Create an empty set for `n` peers.
    pub fn new(n: usize) -> Self {
        Self {
            slots: vec![None; n],
            responded: vec![false; n],
            non_positive: 0,
        }
    }

    /// Forget every reply. Called when a new round starts.
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.responded.iter_mut().for_each(|r| *r = false);
        self.non_positive = 0;
    }

    /// Record the reply from `index`.
    ///
    /// Returns false if the slot is out of range or already replied this
    /// round; the set is left unchanged in that case.
    pub fn record(&mut self, index: usize, est_ballot: Ballot, estimate: Option<Value>) -> bool {
        match self.responded.get_mut(index) {
            Some(responded) if !*responded => *responded = true,
            _ => return false,
        }

        if est_ballot.is_positive() {
            self.slots[index] = Some(GatherEntry {
                estimate,
                est_ballot,
            });
        } else {
            self.non_positive += 1;
        }
        true
    }

    /// Number of stored entries with a positive estimate ballot.
    pub fn positive_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Number of replies without an accepted estimate.
    pub fn non_positive_count(&self) -> usize {
        self.non_positive
    }

    /// Replies that count towards the majority.
    pub fn quorum_count(&self) -> usize {
        self.positive_count() + self.non_positive
    }

    /// The entry with the strictly highest estimate ballot.
    ///
    /// Scans slots in order, so among equal ballots the lowest slot wins.
    pub fn highest(&self) -> Option<GatherEntry> {
        let mut best: Option<GatherEntry> = None;
        for entry in self.slots.iter().flatten() {
            match best {
                Some(b) if entry.est_ballot <= b.est_ballot => {}
                _ => best = Some(*entry),
            }
        }
        best
    }
}
