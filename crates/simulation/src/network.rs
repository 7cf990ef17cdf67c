//! Simulated network with deterministic latency.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use synod_types::ProcessId;

/// Configuration for simulated network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Number of processes.
    pub num_nodes: usize,
    /// Base latency between two distinct processes.
    pub latency: Duration,
    /// Base latency of a message a process sends to itself.
    pub self_latency: Duration,
    /// Jitter as a fraction of base latency (0.0 - 1.0).
    pub jitter_fraction: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            num_nodes: 3,
            latency: Duration::from_millis(10),
            self_latency: Duration::from_millis(1),
            jitter_fraction: 0.1,
        }
    }
}

/// Simulated network for deterministic message delivery.
///
/// Delivery is reliable. Jitter makes it reorderable.
#[derive(Debug)]
pub struct SimulatedNetwork {
    config: NetworkConfig,
}

impl SimulatedNetwork {
    /// Create a new simulated network.
    pub fn new(config: NetworkConfig) -> Self {
        Self { config }
    }

    /// Sample latency for a message between two nodes.
    pub fn sample_latency(&self, from: ProcessId, to: ProcessId, rng: &mut ChaCha8Rng) -> Duration {
        let base = if from == to {
            self.config.self_latency
        } else {
            self.config.latency
        };

        let jitter_range = base.as_secs_f64() * self.config.jitter_fraction.clamp(0.0, 1.0);
        if jitter_range <= 0.0 {
            return base;
        }
        let jitter = rng.gen_range(-jitter_range..jitter_range);
        let latency_secs = (base.as_secs_f64() + jitter).max(0.0001);

        Duration::from_secs_f64(latency_secs)
    }

    /// Get all nodes in the network.
    pub fn all_nodes(&self) -> Vec<ProcessId> {
        (0..self.config.num_nodes).map(ProcessId::from_index).collect()
    }

    /// Get network configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }
}
