//! Node state machine.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use synod_consensus::{Decision, SynodConfig, SynodState};
use synod_core::{Action, Event, StateMachine};
use synod_types::{ProcessId, Value};
use tracing::{info, trace};

/// Combined node state machine.
///
/// Wraps [`SynodState`] with the fault model: once the driver sends a crash
/// signal, every inbound event first rolls the node's own RNG and may turn
/// the node silent. A silent node drops every event, its retry timer
/// included, and never speaks again. Deciding also makes a node silent
/// after it has relayed the decision.
pub struct NodeStateMachine {
    /// This process.
    id: ProcessId,

    /// Protocol state.
    synod: SynodState,

    /// Per-node randomness for crash draws and launch values.
    rng: ChaCha8Rng,

    /// Set by the crash signal.
    fault_prone: bool,

    /// Terminal: nothing is processed once set.
    silent: bool,

    /// Current time.
    now: Duration,
}

impl std::fmt::Debug for NodeStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeStateMachine")
            .field("id", &self.id)
            .field("fault_prone", &self.fault_prone)
            .field("silent", &self.silent)
            .field("synod", &self.synod)
            .field("now", &self.now)
            .finish()
    }
}

impl NodeStateMachine {
    /// Create the node for process `id` in a system of `n` processes.
    ///
    /// `seed` drives every random draw this node makes.
    pub fn new(id: ProcessId, n: usize, config: SynodConfig, seed: u64) -> Self {
        Self {
            id,
            synod: SynodState::new(id, n, config),
            rng: ChaCha8Rng::seed_from_u64(seed),
            fault_prone: false,
            silent: false,
            now: Duration::ZERO,
        }
    }

    /// Arm the retry timer. Runners call this once before delivering events.
    pub fn initialize(&mut self) -> Vec<Action> {
        self.synod.initialize()
    }

    /// This process.
    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// Protocol state.
    pub fn synod(&self) -> &SynodState {
        &self.synod
    }

    /// Whether the node has crashed or decided and stopped processing.
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// Whether the crash signal was received.
    pub fn is_fault_prone(&self) -> bool {
        self.fault_prone
    }

    /// The decision, once made.
    pub fn decision(&self) -> Option<Decision> {
        self.synod.decision()
    }

    /// Roll the crash gate. Returns true if the node just crashed.
    fn crashes(&mut self) -> bool {
        if !self.fault_prone {
            return false;
        }
        let draw: f64 = self.rng.gen();
        if draw < self.synod.config().crash_probability {
            self.silent = true;
            info!(node = %self.id, now = ?self.now, "Crashed");
            return true;
        }
        false
    }

    fn on_launch(&mut self) -> Vec<Action> {
        let draw: f64 = self.rng.gen();
        let value = if draw < self.synod.config().value_bias {
            Value::ONE
        } else {
            Value::ZERO
        };
        info!(node = %self.id, value = %value, "Launched");
        self.synod.propose(value)
    }
}

impl StateMachine for NodeStateMachine {
    fn handle(&mut self, event: Event) -> Vec<Action> {
        if self.silent {
            trace!(node = %self.id, event = event.type_name(), "Silent, dropping event");
            return vec![];
        }

        if self.crashes() {
            return vec![];
        }

        let was_decided = self.synod.decision().is_some();

        let actions = match event {
            // Timers
            Event::RetryTimer => self.synod.on_retry_timer(),

            // Network
            Event::ReadReceived { from, read } => self.synod.on_read(from, read),
            Event::GatherReceived { from, gather } => self.synod.on_gather(from, gather),
            Event::ImposeReceived { from, impose } => self.synod.on_impose(from, impose),
            Event::AckReceived { from, ack } => self.synod.on_ack(from, ack),
            Event::AbortReceived { from, abort } => self.synod.on_abort(from, abort),
            Event::DecideReceived { from, decide } => self.synod.on_decide(from, decide),

            // Driver signals
            Event::DirectoryReceived { directory } => {
                self.synod.on_directory(directory);
                vec![]
            }
            Event::StartClock { at } => {
                self.synod.on_start_clock(at);
                vec![]
            }
            Event::LaunchReceived => self.on_launch(),
            Event::ProposeRequested { value } => self.synod.propose(value),
            Event::CrashSignal => {
                if !self.fault_prone {
                    info!(node = %self.id, "Fault-prone from now on");
                }
                self.fault_prone = true;
                vec![]
            }
            Event::HoldSignal => {
                self.synod.on_hold();
                vec![]
            }
        };

        if !was_decided && self.synod.decision().is_some() {
            trace!(node = %self.id, "Decision relayed, going silent");
            self.silent = true;
        }

        actions
    }

    fn set_time(&mut self, now: Duration) {
        self.now = now;
        self.synod.set_time(now);
    }

    fn now(&self) -> Duration {
        self.now
    }
}
