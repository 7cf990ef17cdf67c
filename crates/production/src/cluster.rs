//! In-process cluster of production runners.
//!
//! Spawns one [`ProductionRunner`] per node and drives the crash-and-hold
//! experiment on wall-clock time.

use crate::config::ClusterConfig;
use crate::runner::{DecisionNotice, Mailboxes, ProductionRunner, RunnerError, ShutdownHandle};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use synod_core::Event;
use synod_node::NodeStateMachine;
use synod_types::{Directory, ProcessId, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// Outcome of a cluster run.
#[derive(Debug, Clone)]
pub struct ClusterReport {
    /// The node left un-held after the decision window.
    pub leader: ProcessId,
    /// Nodes sent a crash signal.
    pub crashed: Vec<ProcessId>,
    /// Nodes that fell silent without deciding.
    pub silent: Vec<ProcessId>,
    /// Decisions in arrival order.
    pub decisions: Vec<DecisionNotice>,
    /// Wall-clock time from the start clock to shutdown.
    pub elapsed: Duration,
}

impl ClusterReport {
    /// Distinct decided values.
    pub fn decided_values(&self) -> BTreeSet<Value> {
        self.decisions.iter().map(|d| d.value).collect()
    }

    /// Whether no two nodes decided differently.
    pub fn agreement(&self) -> bool {
        self.decided_values().len() <= 1
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Cluster Run Complete ===");
        println!("Leader:    {}", self.leader);
        println!("Crashed:   {:?}", self.crashed);
        println!("Silent:    {:?}", self.silent);
        for d in &self.decisions {
            println!(
                "  {} decided {} (ballot {}) after {:?}",
                d.node, d.value, d.ballot, d.latency
            );
        }
        println!("Agreement: {}", self.agreement());
        println!("Elapsed:   {:?}", self.elapsed);
    }
}

/// A running set of nodes wired to each other through their mailboxes.
pub struct LocalCluster {
    config: ClusterConfig,
    mailboxes: Mailboxes,
    handles: Vec<JoinHandle<Result<NodeStateMachine, RunnerError>>>,
    shutdowns: Vec<ShutdownHandle>,
    decisions_rx: mpsc::UnboundedReceiver<DecisionNotice>,
    epoch: Instant,
    rng: ChaCha8Rng,
}

impl LocalCluster {
    /// Spawn one runner per node.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: ClusterConfig) -> Result<Self, RunnerError> {
        config.validate()?;

        let n = config.nodes;
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let synod_config = config.synod_config();
        let epoch = Instant::now();

        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..n).map(|_| mpsc::unbounded_channel()).unzip();
        let mailboxes = Mailboxes::new(senders);
        let (decision_tx, decisions_rx) = mpsc::unbounded_channel();

        let mut handles = Vec::with_capacity(n);
        let mut shutdowns = Vec::with_capacity(n);
        for (index, inbox) in receivers.into_iter().enumerate() {
            let id = ProcessId::from_index(index);
            let node_seed = seed.wrapping_add(index as u64).wrapping_mul(0x517cc1b727220a95);
            let state = NodeStateMachine::new(id, n, synod_config.clone(), node_seed);

            let mut runner = ProductionRunner::new(
                state,
                inbox,
                mailboxes.clone(),
                decision_tx.clone(),
                epoch,
            )?;
            if let Some(handle) = runner.shutdown_handle() {
                shutdowns.push(handle);
            }
            handles.push(tokio::spawn(runner.run()));
        }

        info!(nodes = n, faulty = config.faulty, seed, "Local cluster spawned");

        Ok(Self {
            config,
            mailboxes,
            handles,
            shutdowns,
            decisions_rx,
            epoch,
            rng: ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
        })
    }

    /// The mailboxes of every node.
    pub fn mailboxes(&self) -> &Mailboxes {
        &self.mailboxes
    }

    /// Send a driver signal to one node.
    pub fn send_control(&self, to: ProcessId, event: Event) -> Result<(), RunnerError> {
        self.mailboxes.send(to, event)
    }

    /// Send a driver signal to every node.
    pub fn send_control_all(&self, event: Event) -> Result<(), RunnerError> {
        for id in self.mailboxes.ids() {
            self.mailboxes.send(id, event.clone())?;
        }
        Ok(())
    }

    /// Time since the cluster was spawned.
    pub fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Drive the crash-and-hold experiment, then shut the cluster down.
    pub async fn run_experiment(mut self) -> Result<ClusterReport, RunnerError> {
        let faulty = self.config.faulty;

        let directory = Directory::new(self.mailboxes.ids().collect())?;
        self.send_control_all(Event::DirectoryReceived {
            directory: directory.clone(),
        })?;

        let mut order: Vec<ProcessId> = directory.iter().collect();
        order.shuffle(&mut self.rng);
        let crashed = order[..faulty].to_vec();
        for &id in &crashed {
            self.send_control(id, Event::CrashSignal)?;
        }
        info!(crashed = ?crashed, "Crash signals sent");

        let start = self.elapsed();
        self.send_control_all(Event::StartClock { at: start })?;
        self.send_control_all(Event::LaunchReceived)?;
        tokio::time::sleep(self.config.decision_window()).await;

        let leader = order[faulty];
        for &id in order.iter().filter(|&&id| id != leader) {
            self.send_control(id, Event::HoldSignal)?;
        }
        info!(leader = %leader, "Holding every node but the leader");
        tokio::time::sleep(self.config.observation_window()).await;

        let elapsed = self.elapsed().saturating_sub(start);
        let (states, decisions) = self.shutdown().await?;

        let silent = states
            .iter()
            .filter(|state| state.is_silent() && state.decision().is_none())
            .map(|state| state.id())
            .collect();

        Ok(ClusterReport {
            leader,
            crashed,
            silent,
            decisions,
            elapsed,
        })
    }

    /// Stop every runner and collect final states and decisions.
    pub async fn shutdown(
        mut self,
    ) -> Result<(Vec<NodeStateMachine>, Vec<DecisionNotice>), RunnerError> {
        for handle in self.shutdowns.drain(..) {
            handle.shutdown();
        }

        let mut states = Vec::with_capacity(self.handles.len());
        for handle in self.handles.drain(..) {
            states.push(handle.await??);
        }

        let mut decisions = vec![];
        while let Ok(notice) = self.decisions_rx.try_recv() {
            decisions.push(notice);
        }

        info!(decisions = decisions.len(), "Local cluster shut down");
        Ok((states, decisions))
    }
}
