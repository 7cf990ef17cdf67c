//! Configuration types for the simulator.

use std::time::Duration;
use synod_consensus::SynodConfig;
use synod_simulation::NetworkConfig;
use thiserror::Error;

/// Errors from validating an [`ExperimentConfig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The system needs at least one process.
    #[error("at least one node is required")]
    NoNodes,

    /// A majority of correct processes is required.
    #[error("{faulty} faulty nodes out of {nodes} leaves no correct majority (need faulty < nodes/2)")]
    TooManyFaulty { faulty: usize, nodes: usize },

    /// A probability outside `[0, 1]`.
    #[error("{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    /// The retry timer would fire continuously.
    #[error("retry interval must be non-zero")]
    ZeroRetryInterval,
}

/// Configuration for an experiment run.
#[derive(Clone, Debug)]
pub struct ExperimentConfig {
    /// Number of processes.
    pub num_nodes: usize,

    /// Number of processes sent a crash signal.
    pub num_faulty: usize,

    /// Time all nodes compete before the leader is chosen.
    pub decision_window: Duration,

    /// Time the leader runs alone before the report is taken.
    pub observation_window: Duration,

    /// Protocol configuration shared by every node.
    pub synod: SynodConfig,

    /// Base latency between distinct processes.
    pub latency: Duration,

    /// Jitter as a fraction of latency.
    pub jitter_fraction: f64,

    /// Random seed for deterministic simulation.
    pub seed: u64,
}

impl ExperimentConfig {
    /// Create a configuration with `num_nodes` processes, `num_faulty` of
    /// them fault-prone.
    pub fn new(num_nodes: usize, num_faulty: usize) -> Self {
        Self {
            num_nodes,
            num_faulty,
            decision_window: Duration::from_secs(1),
            observation_window: Duration::from_secs(5),
            synod: SynodConfig::default(),
            latency: Duration::from_millis(10),
            jitter_fraction: 0.1,
            seed: 12345,
        }
    }

    /// Set the decision window.
    pub fn with_decision_window(mut self, window: Duration) -> Self {
        self.decision_window = window;
        self
    }

    /// Set the observation window.
    pub fn with_observation_window(mut self, window: Duration) -> Self {
        self.observation_window = window;
        self
    }

    /// Set the protocol configuration.
    pub fn with_synod(mut self, synod: SynodConfig) -> Self {
        self.synod = synod;
        self
    }

    /// Set the base network latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the configuration describes a runnable experiment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_nodes == 0 {
            return Err(ConfigError::NoNodes);
        }
        if 2 * self.num_faulty >= self.num_nodes {
            return Err(ConfigError::TooManyFaulty {
                faulty: self.num_faulty,
                nodes: self.num_nodes,
            });
        }
        for (name, value) in [
            ("crash_probability", self.synod.crash_probability),
            ("value_bias", self.synod.value_bias),
            ("jitter_fraction", self.jitter_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange { name, value });
            }
        }
        if self.synod.retry_interval.is_zero() {
            return Err(ConfigError::ZeroRetryInterval);
        }
        Ok(())
    }

    /// Convert to a NetworkConfig for the underlying simulation.
    pub fn to_network_config(&self) -> NetworkConfig {
        NetworkConfig {
            num_nodes: self.num_nodes,
            latency: self.latency,
            jitter_fraction: self.jitter_fraction,
            ..Default::default()
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::new(3, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(ExperimentConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_faulty_must_be_minority() {
        assert_eq!(
            ExperimentConfig::new(4, 2).validate(),
            Err(ConfigError::TooManyFaulty {
                faulty: 2,
                nodes: 4
            })
        );
        assert_eq!(ExperimentConfig::new(5, 2).validate(), Ok(()));
        assert_eq!(ExperimentConfig::new(1, 0).validate(), Ok(()));
        assert_eq!(
            ExperimentConfig::new(0, 0).validate(),
            Err(ConfigError::NoNodes)
        );
    }

    #[test]
    fn test_probabilities_checked() {
        let mut config = ExperimentConfig::default();
        config.synod.crash_probability = 1.2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange {
                name: "crash_probability",
                ..
            })
        ));

        let mut config = ExperimentConfig::default();
        config.jitter_fraction = -0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_retry_rejected() {
        let config = ExperimentConfig::default()
            .with_synod(SynodConfig::default().with_retry_interval(Duration::ZERO));
        assert_eq!(config.validate(), Err(ConfigError::ZeroRetryInterval));
    }
}
