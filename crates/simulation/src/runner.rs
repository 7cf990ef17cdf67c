//! Deterministic simulation runner.

use crate::event_queue::EventKey;
use crate::network::{NetworkConfig, SimulatedNetwork};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use synod_consensus::SynodConfig;
use synod_core::{Action, Event, OutboundMessage, StateMachine, TimerId};
use synod_node::NodeStateMachine;
use synod_types::{Ballot, Directory, ProcessId, Value};
use tracing::{debug, info, trace, warn};

/// A decision emitted by a node during the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionRecord {
    /// Deciding node.
    pub node: ProcessId,
    /// Decided value.
    pub value: Value,
    /// The node's own ballot when it decided.
    pub ballot: Ballot,
    /// Time since the node's start clock.
    pub latency: Duration,
    /// Simulation time of the decision.
    pub at: Duration,
}

/// Statistics collected during simulation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SimulationStats {
    /// Total events processed.
    pub events_processed: u64,
    /// Events processed by priority.
    pub events_by_priority: [u64; 3],
    /// Total actions generated.
    pub actions_generated: u64,
    /// Messages scheduled for delivery.
    pub messages_sent: u64,
    /// Messages scheduled for delivery, by message type.
    pub messages_by_type: BTreeMap<&'static str, u64>,
    /// Timers set.
    pub timers_set: u64,
    /// Decisions emitted.
    pub decisions: u64,
}

impl SimulationStats {
    /// Abort replies sent.
    pub fn aborts_sent(&self) -> u64 {
        self.messages_of_type("synod.abort")
    }

    /// Messages of one type sent.
    pub fn messages_of_type(&self, type_name: &str) -> u64 {
        self.messages_by_type.get(type_name).copied().unwrap_or(0)
    }
}

/// Deterministic simulation runner.
///
/// Processes events in deterministic order and executes actions.
/// Given the same seed, produces identical results every run.
///
/// Each node draws its crash and launch randomness from its own RNG,
/// seeded from the runner seed, so the outcome does not depend on how
/// many draws other nodes make.
pub struct SimulationRunner {
    /// All nodes in the simulation, indexed by directory slot.
    nodes: Vec<NodeStateMachine>,

    /// Global event queue, ordered deterministically.
    event_queue: BTreeMap<EventKey, Event>,

    /// Sequence counter for deterministic ordering.
    sequence: u64,

    /// Current simulation time.
    now: Duration,

    /// Network simulator.
    network: SimulatedNetwork,

    /// Every participant, in slot order.
    directory: Directory,

    /// RNG for network conditions (seeded for determinism).
    rng: ChaCha8Rng,

    /// Pending timers, so that re-arming replaces the previous one.
    timers: HashMap<(ProcessId, TimerId), EventKey>,

    /// Decisions in the order they were emitted.
    decisions: Vec<DecisionRecord>,

    /// Statistics.
    stats: SimulationStats,
}

impl SimulationRunner {
    /// Create a new simulation runner with the given configuration.
    ///
    /// Every node is created and its retry timer armed. The directory is not
    /// delivered; drivers send `Event::DirectoryReceived` when they choose.
    pub fn new(network_config: NetworkConfig, synod_config: SynodConfig, seed: u64) -> Self {
        let num_nodes = network_config.num_nodes;
        let network = SimulatedNetwork::new(network_config);
        let rng = ChaCha8Rng::seed_from_u64(seed);
        let directory = Directory::with_size(num_nodes);

        let nodes: Vec<NodeStateMachine> = directory
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let node_seed = seed.wrapping_add(i as u64).wrapping_mul(0x517cc1b727220a95);
                NodeStateMachine::new(id, num_nodes, synod_config.clone(), node_seed)
            })
            .collect();

        info!(num_nodes, seed, "Created simulation runner");

        let mut runner = Self {
            nodes,
            event_queue: BTreeMap::new(),
            sequence: 0,
            now: Duration::ZERO,
            network,
            directory,
            rng,
            timers: HashMap::new(),
            decisions: Vec::new(),
            stats: SimulationStats::default(),
        };

        for index in 0..runner.nodes.len() {
            let id = runner.nodes[index].id();
            let actions = runner.nodes[index].initialize();
            for action in actions {
                runner.process_action(id, action);
            }
        }

        runner
    }

    /// Get simulation statistics.
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Get current simulation time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Get a reference to a node.
    pub fn node(&self, id: ProcessId) -> Option<&NodeStateMachine> {
        slot(id).and_then(|index| self.nodes.get(index))
    }

    /// All nodes, in slot order.
    pub fn nodes(&self) -> &[NodeStateMachine] {
        &self.nodes
    }

    /// Decisions emitted so far.
    pub fn decisions(&self) -> &[DecisionRecord] {
        &self.decisions
    }

    /// The directory of all participants.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Get a reference to the network.
    pub fn network(&self) -> &SimulatedNetwork {
        &self.network
    }

    /// Schedule an event for `node` after `delay`.
    pub fn schedule_initial_event(&mut self, node: ProcessId, delay: Duration, event: Event) {
        let time = self.now + delay;
        self.schedule_event(node, time, event);
    }

    /// Send a driver signal to `node`, delivered at the current time.
    pub fn send_control(&mut self, node: ProcessId, event: Event) {
        self.schedule_event(node, self.now, event);
    }

    /// Send a driver signal to every node.
    pub fn send_control_all(&mut self, event: Event) {
        for node in self.directory.clone().iter() {
            self.send_control(node, event.clone());
        }
    }

    /// Run simulation until no more events or time limit reached.
    ///
    /// The clock ends at `end_time` even if the queue drained earlier, so
    /// that signals sent afterwards are stamped at the end of the window.
    pub fn run_until(&mut self, end_time: Duration) {
        trace!(
            end_time_secs = end_time.as_secs_f64(),
            "Running simulation step"
        );

        while let Some((&key, _)) = self.event_queue.first_key_value() {
            if key.time > end_time {
                debug!(
                    remaining_events = self.event_queue.len(),
                    "Time limit reached"
                );
                break;
            }

            let Some((key, event)) = self.event_queue.pop_first() else {
                break;
            };
            self.now = key.time;
            let node_id = key.node;

            trace!(
                time = ?self.now,
                node = %node_id,
                event = event.type_name(),
                "Processing event"
            );

            self.stats.events_processed += 1;
            self.stats.events_by_priority[event.priority() as usize] += 1;

            let Some(node) = slot(node_id).and_then(|index| self.nodes.get_mut(index)) else {
                warn!(node = %node_id, "Event for unknown node");
                continue;
            };
            node.set_time(self.now);
            let actions = node.handle(event);

            self.stats.actions_generated += actions.len() as u64;

            for action in actions {
                self.process_action(node_id, action);
            }
        }

        self.now = self.now.max(end_time);

        trace!(
            events_processed = self.stats.events_processed,
            actions_generated = self.stats.actions_generated,
            final_time = ?self.now,
            "Simulation step complete"
        );
    }

    /// Run for `duration` of simulated time from now.
    pub fn run_for(&mut self, duration: Duration) {
        self.run_until(self.now + duration);
    }

    /// Process an action from a node.
    fn process_action(&mut self, from: ProcessId, action: Action) {
        match action {
            Action::Broadcast { message } => {
                for to in self.directory.clone().iter() {
                    self.deliver_message(from, to, message);
                }
            }

            Action::Send { to, message } => {
                if self.directory.contains(to) {
                    self.deliver_message(from, to, message);
                } else {
                    warn!(from = %from, to = %to, "Send to unknown process dropped");
                }
            }

            Action::SetTimer { id, duration } => {
                if let Some(previous) = self.timers.remove(&(from, id)) {
                    self.event_queue.remove(&previous);
                }
                let fire_time = self.now + duration;
                let key = self.schedule_event(from, fire_time, id.event());
                self.timers.insert((from, id), key);
                self.stats.timers_set += 1;
            }

            Action::EmitDecision {
                value,
                ballot,
                latency,
            } => {
                self.stats.decisions += 1;
                self.decisions.push(DecisionRecord {
                    node: from,
                    value,
                    ballot,
                    latency,
                    at: self.now,
                });
            }
        }
    }

    /// Schedule an event.
    fn schedule_event(&mut self, node: ProcessId, time: Duration, event: Event) -> EventKey {
        self.sequence += 1;
        let key = EventKey::new(time, &event, node, self.sequence);
        self.event_queue.insert(key, event);
        key
    }

    /// Sample latency and schedule delivery of a message.
    fn deliver_message(&mut self, from: ProcessId, to: ProcessId, message: OutboundMessage) {
        let latency = self.network.sample_latency(from, to, &mut self.rng);
        let delivery_time = self.now + latency;
        self.schedule_event(to, delivery_time, message.into_event(from));

        self.stats.messages_sent += 1;
        *self
            .stats
            .messages_by_type
            .entry(message.type_name())
            .or_default() += 1;
    }
}

/// Directory slot of `id`, if it can have one.
fn slot(id: ProcessId) -> Option<usize> {
    id.0.checked_sub(1).map(|index| index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_new_arms_one_retry_timer_per_node() {
        let runner = SimulationRunner::new(NetworkConfig::default(), SynodConfig::default(), 1);
        assert_eq!(runner.nodes().len(), 3);
        assert_eq!(runner.stats().timers_set, 3);
        assert_eq!(runner.directory().len(), 3);
        assert!(runner.node(ProcessId(3)).is_some());
        assert!(runner.node(ProcessId(0)).is_none());
        assert!(runner.node(ProcessId(4)).is_none());
    }

    #[traced_test]
    #[test]
    fn test_retry_timer_is_replaced_not_duplicated() {
        let mut runner = SimulationRunner::new(NetworkConfig::default(), SynodConfig::default(), 1);
        runner.run_until(Duration::from_millis(500));

        // Each node fires once per 50ms and re-arms exactly one timer.
        assert_eq!(runner.stats().timers_set, 3 + 3 * 10);
        assert_eq!(runner.event_queue.len(), 3);
        assert_eq!(runner.now(), Duration::from_millis(500));
    }

    #[traced_test]
    #[test]
    fn test_single_proposer_decides_without_aborts() {
        let mut runner = SimulationRunner::new(NetworkConfig::default(), SynodConfig::default(), 9);
        runner.send_control_all(Event::DirectoryReceived {
            directory: runner.directory().clone(),
        });
        runner.send_control(ProcessId(1), Event::ProposeRequested { value: Value(7) });
        runner.run_until(Duration::from_millis(200));

        assert_eq!(runner.decisions().len(), 3);
        assert!(runner.decisions().iter().all(|d| d.value == Value(7)));
        assert_eq!(runner.stats().aborts_sent(), 0);
        assert_eq!(runner.stats().messages_of_type("synod.read"), 3);
        assert_eq!(runner.stats().messages_of_type("synod.impose"), 3);
    }
}
