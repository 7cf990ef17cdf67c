//! Production runner implementation.

use crate::timers::TimerManager;
use std::sync::Arc;
use std::time::{Duration, Instant};
use synod_core::{Action, Event, OutboundMessage, StateMachine};
use synod_node::NodeStateMachine;
use synod_types::{Ballot, DirectoryError, ProcessId, Value};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, span, trace, Level};

/// Errors that can occur in the production runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Event channel closed")]
    ChannelClosed,
    #[error("Unknown peer {0}")]
    UnknownPeer(ProcessId),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Node task failed: {0}")]
    NodeTask(#[from] tokio::task::JoinError),
    #[error("Invalid directory: {0}")]
    Directory(#[from] DirectoryError),
}

/// A decision reported by a running node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionNotice {
    /// Deciding node.
    pub node: ProcessId,
    /// Decided value.
    pub value: Value,
    /// The node's own ballot when it decided.
    pub ballot: Ballot,
    /// Time since the node's start clock.
    pub latency: Duration,
}

/// Address book of every node's mailbox, indexed by directory slot.
///
/// Shared read-only by all runners.
#[derive(Debug, Clone)]
pub struct Mailboxes {
    senders: Arc<[mpsc::UnboundedSender<Event>]>,
}

impl Mailboxes {
    /// Build the address book. Slot `i` belongs to `ProcessId(i + 1)`.
    pub fn new(senders: Vec<mpsc::UnboundedSender<Event>>) -> Self {
        Self {
            senders: senders.into(),
        }
    }

    /// Get the mailbox of `id`.
    pub fn get(&self, id: ProcessId) -> Option<&mpsc::UnboundedSender<Event>> {
        id.0.checked_sub(1)
            .and_then(|index| self.senders.get(index as usize))
    }

    /// Enqueue `event` for `to` without waiting.
    pub fn send(&self, to: ProcessId, event: Event) -> Result<(), RunnerError> {
        let mailbox = self.get(to).ok_or(RunnerError::UnknownPeer(to))?;
        mailbox.send(event).map_err(|_| RunnerError::ChannelClosed)
    }

    /// Every addressable process, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = ProcessId> + '_ {
        (0..self.senders.len()).map(ProcessId::from_index)
    }

    /// Number of mailboxes.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    /// Whether the address book is empty.
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

/// Handle for shutting down a running ProductionRunner.
///
/// When dropped, signals the runner to exit gracefully.
#[derive(Debug)]
pub struct ShutdownHandle {
    tx: Option<oneshot::Sender<()>>,
}

impl ShutdownHandle {
    /// Trigger shutdown (consumes the handle).
    pub fn shutdown(mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for ShutdownHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Production runner for one node.
///
/// Owns the node's state machine and drains its mailbox one event at a time.
pub struct ProductionRunner {
    state: NodeStateMachine,
    inbox: mpsc::UnboundedReceiver<Event>,
    timers: TimerManager,
    mailboxes: Mailboxes,
    decisions: mpsc::UnboundedSender<DecisionNotice>,
    /// Reference instant for the state machine clock, shared by the cluster.
    epoch: Instant,
    shutdown_rx: oneshot::Receiver<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ProductionRunner {
    /// Create a runner for `state`, reading from `inbox`.
    ///
    /// `mailboxes` must contain the node's own mailbox; timers post into it.
    pub fn new(
        state: NodeStateMachine,
        inbox: mpsc::UnboundedReceiver<Event>,
        mailboxes: Mailboxes,
        decisions: mpsc::UnboundedSender<DecisionNotice>,
        epoch: Instant,
    ) -> Result<Self, RunnerError> {
        let own = mailboxes
            .get(state.id())
            .cloned()
            .ok_or(RunnerError::UnknownPeer(state.id()))?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        Ok(Self {
            state,
            inbox,
            timers: TimerManager::new(own),
            mailboxes,
            decisions,
            epoch,
            shutdown_rx,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Take the shutdown handle.
    ///
    /// Returns a handle that when dropped triggers graceful shutdown.
    /// Returns `None` if the handle was already taken.
    pub fn shutdown_handle(&mut self) -> Option<ShutdownHandle> {
        self.shutdown_tx
            .take()
            .map(|tx| ShutdownHandle { tx: Some(tx) })
    }

    /// Run the event loop until shutdown.
    ///
    /// Returns the node's final state.
    pub async fn run(mut self) -> Result<NodeStateMachine, RunnerError> {
        let id = self.state.id();
        info!(node = %id, "Starting production runner");

        self.state.set_time(self.epoch.elapsed());
        for action in self.state.initialize() {
            self.process_action(action);
        }

        loop {
            tokio::select! {
                biased;

                _ = &mut self.shutdown_rx => {
                    info!(node = %id, "Shutdown signal received");
                    break;
                }

                event = self.inbox.recv() => {
                    let Some(event) = event else {
                        debug!(node = %id, "Mailbox closed");
                        break;
                    };

                    let event_span = span!(
                        Level::TRACE,
                        "handle_event",
                        event.type = %event.type_name(),
                        node = %id,
                    );
                    let _event_guard = event_span.enter();

                    self.state.set_time(self.epoch.elapsed());
                    let actions = self.state.handle(event);
                    for action in actions {
                        self.process_action(action);
                    }
                }
            }
        }

        self.timers.cancel_all();
        Ok(self.state)
    }

    fn process_action(&mut self, action: Action) {
        let from = self.state.id();
        match action {
            Action::Broadcast { message } => {
                for to in self.mailboxes.ids() {
                    self.deliver(from, to, message);
                }
            }

            Action::Send { to, message } => self.deliver(from, to, message),

            Action::SetTimer { id, duration } => self.timers.set_timer(id, duration),

            Action::EmitDecision {
                value,
                ballot,
                latency,
            } => {
                let notice = DecisionNotice {
                    node: from,
                    value,
                    ballot,
                    latency,
                };
                if self.decisions.send(notice).is_err() {
                    debug!(node = %from, "Decision sink closed");
                }
            }
        }
    }

    fn deliver(&self, from: ProcessId, to: ProcessId, message: OutboundMessage) {
        // Peers may already be gone at shutdown.
        if let Err(e) = self.mailboxes.send(to, message.into_event(from)) {
            trace!(from = %from, to = %to, error = %e, "Message not delivered");
        }
    }
}
