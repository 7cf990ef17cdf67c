//! Synod protocol state.

use crate::{GatherSet, SynodConfig};
use std::collections::BTreeSet;
use std::time::Duration;
use synod_core::{Action, OutboundMessage, TimerId};
use synod_messages::{
    AbortResponse, AckResponse, DecideAnnouncement, GatherResponse, ImposeRequest, ReadRequest,
};
use synod_types::{has_majority, majority_threshold, Ballot, Directory, ProcessId, Value};
use tracing::{debug, info, trace, warn};

/// A decision recorded by this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// The decided value.
    pub value: Value,
    /// Time from the start clock until the decision arrived.
    pub latency: Duration,
}

/// Per-node protocol state.
///
/// Holds the acceptor side (read/impose ballots and the current estimate)
/// and the proposer side (own ballot, gathered estimates, ack count) of one
/// process. Every handler is synchronous and returns the actions the runner
/// must perform.
pub struct SynodState {
    id: ProcessId,
    n: usize,
    config: SynodConfig,
    directory: Option<Directory>,

    // Proposer side
    ballot: Ballot,
    proposal: Option<Value>,
    gathered: GatherSet,
    ack_count: usize,
    ackers: BTreeSet<ProcessId>,
    /// Last ballot for which the gather majority fired.
    prev_gather_ballot: Ballot,
    /// Last ballot for which an abort was acted on.
    prev_abort_ballot: Ballot,
    proposing: bool,
    held: bool,

    // Acceptor side
    read_ballot: Ballot,
    impose_ballot: Ballot,
    estimate: Option<Value>,

    decision: Option<Decision>,
    start_time: Duration,
    now: Duration,
}

impl std::fmt::Debug for SynodState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynodState")
            .field("id", &self.id)
            .field("ballot", &self.ballot)
            .field("read_ballot", &self.read_ballot)
            .field("impose_ballot", &self.impose_ballot)
            .field("estimate", &self.estimate)
            .field("proposal", &self.proposal)
            .field("decision", &self.decision)
            .finish()
    }
}

impl SynodState {
    /// Create the state for process `id` in a system of `n` processes.
    pub fn new(id: ProcessId, n: usize, config: SynodConfig) -> Self {
        let initial = Ballot::initial(id, n);
        Self {
            id,
            n,
            config,
            directory: None,
            ballot: initial,
            proposal: None,
            gathered: GatherSet::new(n),
            ack_count: 0,
            ackers: BTreeSet::new(),
            prev_gather_ballot: Ballot::floor(n),
            prev_abort_ballot: Ballot::floor(n),
            proposing: true,
            held: false,
            read_ballot: Ballot::ZERO,
            impose_ballot: initial,
            estimate: None,
            decision: None,
            start_time: Duration::ZERO,
            now: Duration::ZERO,
        }
    }

    /// Arm the retry timer. Called once when the node starts.
    pub fn initialize(&mut self) -> Vec<Action> {
        vec![self.retry_timer()]
    }

    /// Update the current time.
    pub fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Driver signals
    // ═══════════════════════════════════════════════════════════════════════

    /// Install the directory of participants.
    ///
    /// Only the first directory is kept; later deliveries are ignored.
    pub fn on_directory(&mut self, directory: Directory) {
        if self.directory.is_some() {
            warn!(
                node = %self.id,
                peers = directory.len(),
                "Directory already installed, ignoring"
            );
            return;
        }
        if directory.len() != self.n {
            warn!(
                node = %self.id,
                expected = self.n,
                actual = directory.len(),
                "Directory size does not match system size"
            );
        }
        debug!(
            node = %self.id,
            peers = directory.len(),
            quorum = majority_threshold(self.n),
            "Directory installed"
        );
        self.directory = Some(directory);
    }

    /// Record the reference instant for decision latency.
    pub fn on_start_clock(&mut self, at: Duration) {
        self.start_time = at;
    }

    /// Stop re-proposing from the retry timer. Idempotent.
    pub fn on_hold(&mut self) {
        if !self.held {
            debug!(node = %self.id, "Holding, retry timer will no longer re-propose");
        }
        self.held = true;
    }

    /// Open a new round proposing `value`.
    ///
    /// The ballot advances by `N` and the round's gather and ack bookkeeping
    /// is reset. Without a directory the value is only recorded; the retry
    /// timer proposes it once peers are known.
    pub fn propose(&mut self, value: Value) -> Vec<Action> {
        self.proposal = Some(value);

        if self.directory.is_none() {
            warn!(node = %self.id, value = %value, "Propose before directory, nothing sent");
            self.proposing = false;
            return vec![];
        }

        self.proposing = true;
        self.ballot = self.ballot.next(self.n);
        self.reset_round();

        info!(
            node = %self.id,
            ballot = self.ballot.get(),
            value = %value,
            "Proposing"
        );

        vec![Action::Broadcast {
            message: OutboundMessage::Read(ReadRequest::new(self.ballot)),
        }]
    }

    /// Handle the retry timer.
    ///
    /// Always reschedules itself. Re-proposes the last proposal when the
    /// previous round was aborted and the node is not held.
    pub fn on_retry_timer(&mut self) -> Vec<Action> {
        let mut actions = vec![self.retry_timer()];

        if self.held || self.proposing {
            return actions;
        }

        if let Some(value) = self.proposal {
            debug!(node = %self.id, ballot = self.ballot.get(), "Retry timer re-proposing");
            actions.extend(self.propose(value));
        }
        actions
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Acceptor side
    // ═══════════════════════════════════════════════════════════════════════

    /// Handle a read request.
    ///
    /// Promises the ballot and replies with the current estimate, or aborts
    /// if a higher ballot has already been read or imposed.
    pub fn on_read(&mut self, from: ProcessId, read: ReadRequest) -> Vec<Action> {
        if self.is_stale(read.ballot) {
            debug!(
                node = %self.id,
                from = %from,
                ballot = read.ballot.get(),
                read_ballot = self.read_ballot.get(),
                impose_ballot = self.impose_ballot.get(),
                "Aborting stale read"
            );
            return vec![self.abort(from, read.ballot)];
        }

        self.read_ballot = read.ballot;
        trace!(node = %self.id, from = %from, ballot = read.ballot.get(), "Read promised");

        vec![Action::Send {
            to: from,
            message: OutboundMessage::Gather(GatherResponse::new(
                read.ballot,
                self.impose_ballot,
                self.estimate,
            )),
        }]
    }

    /// Handle an impose request.
    ///
    /// Accepts the value and acknowledges, or aborts if a higher ballot has
    /// already been read or imposed.
    pub fn on_impose(&mut self, from: ProcessId, impose: ImposeRequest) -> Vec<Action> {
        if self.is_stale(impose.ballot) {
            debug!(
                node = %self.id,
                from = %from,
                ballot = impose.ballot.get(),
                read_ballot = self.read_ballot.get(),
                impose_ballot = self.impose_ballot.get(),
                "Aborting stale impose"
            );
            return vec![self.abort(from, impose.ballot)];
        }

        self.estimate = Some(impose.value);
        self.impose_ballot = impose.ballot;
        trace!(
            node = %self.id,
            from = %from,
            ballot = impose.ballot.get(),
            value = %impose.value,
            "Impose accepted"
        );

        vec![Action::Send {
            to: from,
            message: OutboundMessage::Ack(AckResponse::new(impose.ballot)),
        }]
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Proposer side
    // ═══════════════════════════════════════════════════════════════════════

    /// Handle a gather reply.
    ///
    /// On the first majority for the current ballot, adopts the estimate with
    /// the highest estimate ballot (if any) and broadcasts `Impose`.
    pub fn on_gather(&mut self, from: ProcessId, gather: GatherResponse) -> Vec<Action> {
        if gather.ballot != self.ballot {
            trace!(
                node = %self.id,
                from = %from,
                ballot = gather.ballot.get(),
                current = self.ballot.get(),
                "Ignoring gather for another round"
            );
            return vec![];
        }

        let slot = from.0.checked_sub(1).map_or(usize::MAX, |i| i as usize);
        if !self
            .gathered
            .record(slot, gather.est_ballot, gather.estimate)
        {
            debug!(node = %self.id, from = %from, "Ignoring duplicate or unknown gather");
            return vec![];
        }

        if !has_majority(self.gathered.quorum_count(), self.n)
            || self.prev_gather_ballot == gather.ballot
        {
            return vec![];
        }
        self.prev_gather_ballot = gather.ballot;

        if let Some(entry) = self.gathered.highest() {
            if let Some(value) = entry.estimate {
                debug!(
                    node = %self.id,
                    est_ballot = entry.est_ballot.get(),
                    value = %value,
                    "Adopting highest gathered estimate"
                );
                self.proposal = Some(value);
            }
        }

        let Some(value) = self.proposal else {
            warn!(node = %self.id, "Gather majority without a proposal");
            return vec![];
        };

        self.reset_round();
        info!(
            node = %self.id,
            ballot = self.ballot.get(),
            value = %value,
            "Gather majority, imposing"
        );

        vec![Action::Broadcast {
            message: OutboundMessage::Impose(ImposeRequest::new(self.ballot, value)),
        }]
    }

    /// Handle an ack.
    ///
    /// On a majority of acks for the current ballot, broadcasts `Decide`.
    pub fn on_ack(&mut self, from: ProcessId, ack: AckResponse) -> Vec<Action> {
        if ack.ballot != self.ballot {
            trace!(
                node = %self.id,
                from = %from,
                ballot = ack.ballot.get(),
                current = self.ballot.get(),
                "Ignoring ack for another round"
            );
            return vec![];
        }

        if !self.ackers.insert(from) {
            debug!(node = %self.id, from = %from, "Ignoring duplicate ack");
            return vec![];
        }

        self.ack_count += 1;
        if !has_majority(self.ack_count, self.n) {
            return vec![];
        }
        self.ack_count = 0;

        let Some(value) = self.proposal else {
            warn!(node = %self.id, "Ack majority without a proposal");
            return vec![];
        };

        info!(
            node = %self.id,
            ballot = self.ballot.get(),
            value = %value,
            "Ack majority, deciding"
        );

        vec![Action::Broadcast {
            message: OutboundMessage::Decide(DecideAnnouncement::new(value)),
        }]
    }

    /// Handle an abort.
    ///
    /// Stops driving the round the first time an abort is seen for a given
    /// ballot. Aborts after a decision are ignored.
    pub fn on_abort(&mut self, from: ProcessId, abort: AbortResponse) -> Vec<Action> {
        if self.decision.is_some() || abort.ballot == self.prev_abort_ballot {
            return vec![];
        }

        self.prev_abort_ballot = abort.ballot;
        self.proposing = false;
        debug!(
            node = %self.id,
            from = %from,
            ballot = abort.ballot.get(),
            "Round aborted, waiting for retry"
        );
        vec![]
    }

    /// Handle a decide announcement.
    ///
    /// The first one received fixes the decision, which is emitted and
    /// relayed once. Later announcements are ignored.
    pub fn on_decide(&mut self, from: ProcessId, decide: DecideAnnouncement) -> Vec<Action> {
        if self.decision.is_some() {
            trace!(node = %self.id, from = %from, "Already decided");
            return vec![];
        }

        let latency = self.now.saturating_sub(self.start_time);
        self.decision = Some(Decision {
            value: decide.value,
            latency,
        });

        info!(
            node = %self.id,
            from = %from,
            value = %decide.value,
            ballot = self.ballot.get(),
            latency_ms = latency.as_millis() as u64,
            "Decided"
        );

        let mut actions = vec![Action::EmitDecision {
            value: decide.value,
            ballot: self.ballot,
            latency,
        }];
        if self.directory.is_some() {
            actions.push(Action::Broadcast {
                message: OutboundMessage::Decide(decide),
            });
        }
        actions
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════

    /// This process.
    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// Own ballot.
    pub fn ballot(&self) -> Ballot {
        self.ballot
    }

    /// Highest ballot promised to a reader.
    pub fn read_ballot(&self) -> Ballot {
        self.read_ballot
    }

    /// Ballot under which the current estimate was accepted.
    pub fn impose_ballot(&self) -> Ballot {
        self.impose_ballot
    }

    /// Last accepted value.
    pub fn estimate(&self) -> Option<Value> {
        self.estimate
    }

    /// Value this node is currently driving.
    pub fn proposal(&self) -> Option<Value> {
        self.proposal
    }

    /// Whether the current round has not been aborted.
    pub fn is_proposing(&self) -> bool {
        self.proposing
    }

    /// Whether a hold signal was received.
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Whether a directory is installed.
    pub fn has_directory(&self) -> bool {
        self.directory.is_some()
    }

    /// Acks counted towards the current round.
    pub fn ack_count(&self) -> usize {
        self.ack_count
    }

    /// Gather replies of the current round.
    pub fn gathered(&self) -> &GatherSet {
        &self.gathered
    }

    /// The decision, once made.
    pub fn decision(&self) -> Option<Decision> {
        self.decision
    }

    /// Configuration in use.
    pub fn config(&self) -> &SynodConfig {
        &self.config
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Internals
    // ═══════════════════════════════════════════════════════════════════════

    fn is_stale(&self, ballot: Ballot) -> bool {
        self.read_ballot > ballot || self.impose_ballot > ballot
    }

    fn abort(&self, to: ProcessId, ballot: Ballot) -> Action {
        Action::Send {
            to,
            message: OutboundMessage::Abort(AbortResponse::new(ballot)),
        }
    }

    fn retry_timer(&self) -> Action {
        Action::SetTimer {
            id: TimerId::Retry,
            duration: self.config.retry_interval,
        }
    }

    fn reset_round(&mut self) {
        self.gathered.reset();
        self.ack_count = 0;
        self.ackers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn make_state(id: u32, n: usize) -> SynodState {
        let mut state = SynodState::new(ProcessId(id), n, SynodConfig::default());
        state.on_directory(Directory::with_size(n));
        state
    }

    fn broadcast_of(actions: &[Action]) -> Option<OutboundMessage> {
        actions.iter().find_map(|a| match a {
            Action::Broadcast { message } => Some(*message),
            _ => None,
        })
    }

    fn sent_to(actions: &[Action]) -> Option<(ProcessId, OutboundMessage)> {
        actions.iter().find_map(|a| match a {
            Action::Send { to, message } => Some((*to, *message)),
            _ => None,
        })
    }

    /// Drive `state` through a full read phase with the given gather replies.
    fn gather_all(
        state: &mut SynodState,
        replies: &[(u32, Ballot, Option<Value>)],
    ) -> Vec<Action> {
        let ballot = state.ballot();
        let mut actions = vec![];
        for (from, est_ballot, estimate) in replies {
            actions.extend(state.on_gather(
                ProcessId(*from),
                GatherResponse::new(ballot, *est_ballot, *estimate),
            ));
        }
        actions
    }

    #[traced_test]
    #[test]
    fn test_initial_state() {
        let state = SynodState::new(ProcessId(2), 3, SynodConfig::default());
        assert_eq!(state.ballot(), Ballot(-1));
        assert_eq!(state.impose_ballot(), Ballot(-1));
        assert_eq!(state.read_ballot(), Ballot::ZERO);
        assert_eq!(state.estimate(), None);
        assert!(state.is_proposing());
        assert!(!state.is_held());
        assert!(!state.has_directory());
    }

    #[traced_test]
    #[test]
    fn test_initialize_arms_retry_timer() {
        let mut state = make_state(1, 3);
        let actions = state.initialize();
        assert_eq!(
            actions,
            vec![Action::SetTimer {
                id: TimerId::Retry,
                duration: Duration::from_millis(50),
            }]
        );
    }

    #[traced_test]
    #[test]
    fn test_propose_advances_ballot_by_n() {
        let mut state = make_state(1, 3);
        let mut seen = vec![state.ballot()];
        for _ in 0..3 {
            let actions = state.propose(Value::ONE);
            assert_eq!(
                broadcast_of(&actions),
                Some(OutboundMessage::Read(ReadRequest::new(state.ballot())))
            );
            seen.push(state.ballot());
        }
        assert_eq!(seen, vec![Ballot(-2), Ballot(1), Ballot(4), Ballot(7)]);
        assert!(state.is_proposing());
        assert_eq!(state.proposal(), Some(Value::ONE));
    }

    #[traced_test]
    #[test]
    fn test_propose_without_directory_sends_nothing() {
        let mut state = SynodState::new(ProcessId(1), 3, SynodConfig::default());
        let actions = state.propose(Value::ONE);
        assert!(actions.is_empty());
        assert_eq!(state.proposal(), Some(Value::ONE));
        assert_eq!(state.ballot(), Ballot(-2));

        // Once peers are known, the retry timer drives the recorded value.
        state.on_directory(Directory::with_size(3));
        let actions = state.on_retry_timer();
        assert_eq!(
            broadcast_of(&actions),
            Some(OutboundMessage::Read(ReadRequest::new(Ballot(1))))
        );
    }

    #[traced_test]
    #[test]
    fn test_second_directory_ignored() {
        let mut state = make_state(1, 3);
        state.on_directory(Directory::with_size(1));
        assert_eq!(state.directory.as_ref().map(Directory::len), Some(3));
        assert!(logs_contain("Directory already installed"));

        // Rounds still span the first directory.
        let actions = state.propose(Value::ONE);
        assert_eq!(
            broadcast_of(&actions),
            Some(OutboundMessage::Read(ReadRequest::new(Ballot(1))))
        );
    }

    #[traced_test]
    #[test]
    fn test_read_promises_and_returns_estimate() {
        let mut state = make_state(2, 3);
        let actions = state.on_read(ProcessId(1), ReadRequest::new(Ballot(1)));
        assert_eq!(state.read_ballot(), Ballot(1));
        assert_eq!(
            sent_to(&actions),
            Some((
                ProcessId(1),
                OutboundMessage::Gather(GatherResponse::new(Ballot(1), Ballot(-1), None))
            ))
        );
    }

    #[traced_test]
    #[test]
    fn test_stale_read_aborts() {
        let mut state = make_state(2, 3);
        state.on_read(ProcessId(3), ReadRequest::new(Ballot(3)));

        let actions = state.on_read(ProcessId(1), ReadRequest::new(Ballot(1)));
        assert_eq!(
            sent_to(&actions),
            Some((
                ProcessId(1),
                OutboundMessage::Abort(AbortResponse::new(Ballot(1)))
            ))
        );
        assert_eq!(state.read_ballot(), Ballot(3));

        // An equal ballot is not stale.
        let actions = state.on_read(ProcessId(3), ReadRequest::new(Ballot(3)));
        assert!(matches!(
            sent_to(&actions),
            Some((_, OutboundMessage::Gather(_)))
        ));
    }

    #[traced_test]
    #[test]
    fn test_impose_accepts_and_acks() {
        let mut state = make_state(3, 3);
        state.on_read(ProcessId(1), ReadRequest::new(Ballot(1)));
        let actions = state.on_impose(ProcessId(1), ImposeRequest::new(Ballot(1), Value::ONE));

        assert_eq!(state.estimate(), Some(Value::ONE));
        assert_eq!(state.impose_ballot(), Ballot(1));
        assert_eq!(
            sent_to(&actions),
            Some((
                ProcessId(1),
                OutboundMessage::Ack(AckResponse::new(Ballot(1)))
            ))
        );

        // A later read reports the accepted estimate.
        let actions = state.on_read(ProcessId(2), ReadRequest::new(Ballot(2)));
        assert_eq!(
            sent_to(&actions),
            Some((
                ProcessId(2),
                OutboundMessage::Gather(GatherResponse::new(
                    Ballot(2),
                    Ballot(1),
                    Some(Value::ONE)
                ))
            ))
        );
    }

    #[traced_test]
    #[test]
    fn test_stale_impose_aborts() {
        let mut state = make_state(3, 3);
        state.on_read(ProcessId(2), ReadRequest::new(Ballot(5)));
        let actions = state.on_impose(ProcessId(1), ImposeRequest::new(Ballot(4), Value::ONE));
        assert_eq!(
            sent_to(&actions),
            Some((
                ProcessId(1),
                OutboundMessage::Abort(AbortResponse::new(Ballot(4)))
            ))
        );
        assert_eq!(state.estimate(), None);
    }

    #[traced_test]
    #[test]
    fn test_gather_majority_imposes_own_proposal() {
        let mut state = make_state(1, 3);
        state.propose(Value::ZERO);

        let actions = gather_all(&mut state, &[(1, Ballot(-2), None)]);
        assert!(actions.is_empty(), "one reply out of three is not a majority");

        let actions = gather_all(&mut state, &[(2, Ballot(-1), None)]);
        assert_eq!(
            broadcast_of(&actions),
            Some(OutboundMessage::Impose(ImposeRequest::new(
                Ballot(1),
                Value::ZERO
            )))
        );

        // The third reply does not fire the majority again.
        let actions = gather_all(&mut state, &[(3, Ballot(0), None)]);
        assert!(actions.is_empty());
    }

    #[traced_test]
    #[test]
    fn test_gather_adopts_highest_estimate() {
        let mut state = make_state(1, 5);
        state.propose(Value::ZERO);
        let actions = gather_all(
            &mut state,
            &[
                (2, Ballot(7), Some(Value(20))),
                (4, Ballot(9), Some(Value(40))),
                (3, Ballot(9), Some(Value(30))),
            ],
        );
        assert_eq!(
            broadcast_of(&actions),
            Some(OutboundMessage::Impose(ImposeRequest::new(
                state.ballot(),
                Value(30)
            )))
        );
        assert_eq!(state.proposal(), Some(Value(30)));
    }

    #[traced_test]
    #[test]
    fn test_gather_for_old_round_ignored() {
        let mut state = make_state(1, 3);
        state.propose(Value::ONE);
        let old = state.ballot();
        state.propose(Value::ONE);

        let mut actions = vec![];
        for from in 1..=3 {
            actions.extend(
                state.on_gather(ProcessId(from), GatherResponse::new(old, Ballot(-2), None)),
            );
        }
        assert!(actions.is_empty());
        assert_eq!(state.gathered().quorum_count(), 0);
    }

    #[traced_test]
    #[test]
    fn test_duplicate_gather_not_counted() {
        let mut state = make_state(1, 3);
        state.propose(Value::ONE);
        let actions = gather_all(&mut state, &[(2, Ballot(-1), None), (2, Ballot(-1), None)]);
        assert!(actions.is_empty());
        assert_eq!(state.gathered().quorum_count(), 1);
    }

    fn impose_round(state: &mut SynodState) {
        state.propose(Value::ONE);
        gather_all(state, &[(1, Ballot(-2), None), (2, Ballot(-1), None)]);
    }

    #[traced_test]
    #[test]
    fn test_ack_majority_of_three() {
        let mut state = make_state(1, 3);
        impose_round(&mut state);
        let ballot = state.ballot();

        assert!(state.on_ack(ProcessId(1), AckResponse::new(ballot)).is_empty());
        let actions = state.on_ack(ProcessId(2), AckResponse::new(ballot));
        assert_eq!(
            broadcast_of(&actions),
            Some(OutboundMessage::Decide(DecideAnnouncement::new(Value::ONE)))
        );
        assert_eq!(state.ack_count(), 0);

        // The third ack does not decide a second time.
        assert!(state.on_ack(ProcessId(3), AckResponse::new(ballot)).is_empty());
    }

    #[traced_test]
    #[test]
    fn test_ack_majority_of_five_needs_three() {
        let mut state = make_state(1, 5);
        state.propose(Value::ONE);
        gather_all(
            &mut state,
            &[(1, Ballot(-4), None), (2, Ballot(-3), None), (3, Ballot(-2), None)],
        );
        let ballot = state.ballot();

        assert!(state.on_ack(ProcessId(1), AckResponse::new(ballot)).is_empty());
        assert!(state.on_ack(ProcessId(2), AckResponse::new(ballot)).is_empty());
        let actions = state.on_ack(ProcessId(4), AckResponse::new(ballot));
        assert!(broadcast_of(&actions).is_some_and(|m| m.is_decide()));
    }

    #[traced_test]
    #[test]
    fn test_duplicate_and_stale_acks_ignored() {
        let mut state = make_state(1, 3);
        impose_round(&mut state);
        let ballot = state.ballot();

        state.on_ack(ProcessId(2), AckResponse::new(ballot));
        assert!(state.on_ack(ProcessId(2), AckResponse::new(ballot)).is_empty());
        assert!(state
            .on_ack(ProcessId(3), AckResponse::new(Ballot(ballot.get() - 3)))
            .is_empty());
        assert_eq!(state.ack_count(), 1);
    }

    #[traced_test]
    #[test]
    fn test_abort_stops_proposing_once_per_ballot() {
        let mut state = make_state(1, 3);
        state.propose(Value::ONE);
        let ballot = state.ballot();

        state.on_abort(ProcessId(2), AbortResponse::new(ballot));
        assert!(!state.is_proposing());

        // The retry timer re-proposes; a second abort for the old ballot is ignored.
        state.on_retry_timer();
        assert!(state.is_proposing());
        state.on_abort(ProcessId(3), AbortResponse::new(ballot));
        assert!(state.is_proposing());
    }

    #[traced_test]
    #[test]
    fn test_retry_timer_reschedules_and_reproposes() {
        let mut state = make_state(2, 3);

        // Still proposing: only reschedule.
        let actions = state.on_retry_timer();
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], Action::SetTimer { id: TimerId::Retry, .. }));

        state.propose(Value::ZERO);
        state.on_abort(ProcessId(1), AbortResponse::new(state.ballot()));
        let before = state.ballot();

        let actions = state.on_retry_timer();
        assert!(matches!(actions[0], Action::SetTimer { id: TimerId::Retry, .. }));
        assert_eq!(state.ballot(), before.next(3));
        assert_eq!(
            broadcast_of(&actions),
            Some(OutboundMessage::Read(ReadRequest::new(state.ballot())))
        );
    }

    #[traced_test]
    #[test]
    fn test_hold_suppresses_retry() {
        let mut state = make_state(2, 3);
        state.propose(Value::ZERO);
        state.on_abort(ProcessId(1), AbortResponse::new(state.ballot()));
        state.on_hold();
        state.on_hold();
        let before = state.ballot();

        let actions = state.on_retry_timer();
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], Action::SetTimer { .. }));
        assert_eq!(state.ballot(), before);
        assert!(state.is_held());
    }

    #[traced_test]
    #[test]
    fn test_first_decide_wins_and_is_relayed_once() {
        let mut state = make_state(3, 3);
        state.on_start_clock(Duration::from_millis(100));
        state.set_time(Duration::from_millis(130));

        let actions = state.on_decide(ProcessId(1), DecideAnnouncement::new(Value::ONE));
        assert_eq!(
            actions[0],
            Action::EmitDecision {
                value: Value::ONE,
                ballot: Ballot(0),
                latency: Duration::from_millis(30),
            }
        );
        assert_eq!(
            broadcast_of(&actions),
            Some(OutboundMessage::Decide(DecideAnnouncement::new(Value::ONE)))
        );

        let actions = state.on_decide(ProcessId(2), DecideAnnouncement::new(Value::ZERO));
        assert!(actions.is_empty());
        assert_eq!(
            state.decision(),
            Some(Decision {
                value: Value::ONE,
                latency: Duration::from_millis(30),
            })
        );
    }

    #[traced_test]
    #[test]
    fn test_relay_carries_received_value_not_own_proposal() {
        let mut state = make_state(2, 3);
        state.propose(Value::ZERO);

        let actions = state.on_decide(ProcessId(1), DecideAnnouncement::new(Value::ONE));
        assert_eq!(
            broadcast_of(&actions),
            Some(OutboundMessage::Decide(DecideAnnouncement::new(Value::ONE)))
        );
        assert_eq!(state.decision().map(|d| d.value), Some(Value::ONE));
        assert_eq!(state.proposal(), Some(Value::ZERO));
    }

    #[traced_test]
    #[test]
    fn test_abort_after_decision_ignored() {
        let mut state = make_state(1, 3);
        state.propose(Value::ONE);
        state.on_decide(ProcessId(2), DecideAnnouncement::new(Value::ONE));
        state.on_abort(ProcessId(3), AbortResponse::new(state.ballot()));
        assert!(state.is_proposing());
    }
}
