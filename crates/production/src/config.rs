//! Local cluster configuration.
//!
//! Example TOML:
//!
//! ```toml
//! nodes = 5
//! faulty = 2
//! decision_window_ms = 1000
//! observation_window_ms = 5000
//!
//! [protocol]
//! retry_interval_ms = 50
//! crash_probability = 0.2
//! value_bias = 0.5
//! ```

use crate::runner::RunnerError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use synod_consensus::SynodConfig;

/// Top-level cluster configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterConfig {
    /// Number of nodes.
    #[serde(default = "default_nodes")]
    pub nodes: usize,

    /// Number of fault-prone nodes.
    #[serde(default = "default_faulty")]
    pub faulty: usize,

    /// Time all nodes compete before the leader is chosen (milliseconds).
    #[serde(default = "default_decision_window_ms")]
    pub decision_window_ms: u64,

    /// Time the leader runs alone before shutdown (milliseconds).
    #[serde(default = "default_observation_window_ms")]
    pub observation_window_ms: u64,

    /// Seed for node randomness and the crash/leader draw. Random if unset.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Protocol configuration.
    #[serde(default)]
    pub protocol: ProtocolConfig,
}

/// Protocol section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProtocolConfig {
    /// Retry timer period (milliseconds).
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Per-event crash probability of fault-prone nodes.
    #[serde(default = "default_crash_probability")]
    pub crash_probability: f64,

    /// Probability of launching with value `1`.
    #[serde(default = "default_value_bias")]
    pub value_bias: f64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            retry_interval_ms: default_retry_interval_ms(),
            crash_probability: default_crash_probability(),
            value_bias: default_value_bias(),
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            faulty: default_faulty(),
            decision_window_ms: default_decision_window_ms(),
            observation_window_ms: default_observation_window_ms(),
            seed: None,
            protocol: ProtocolConfig::default(),
        }
    }
}

fn default_nodes() -> usize {
    3
}

fn default_faulty() -> usize {
    1
}

fn default_decision_window_ms() -> u64 {
    1000
}

fn default_observation_window_ms() -> u64 {
    5000
}

fn default_retry_interval_ms() -> u64 {
    50
}

fn default_crash_probability() -> f64 {
    0.2
}

fn default_value_bias() -> f64 {
    0.5
}

impl ClusterConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, RunnerError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, RunnerError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Check the configuration describes a runnable cluster.
    pub fn validate(&self) -> Result<(), RunnerError> {
        if self.nodes == 0 {
            return Err(RunnerError::InvalidConfig("at least one node is required".into()));
        }
        if 2 * self.faulty >= self.nodes {
            return Err(RunnerError::InvalidConfig(format!(
                "{} faulty nodes out of {} leaves no correct majority",
                self.faulty, self.nodes
            )));
        }
        for (name, value) in [
            ("crash_probability", self.protocol.crash_probability),
            ("value_bias", self.protocol.value_bias),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RunnerError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.protocol.retry_interval_ms == 0 {
            return Err(RunnerError::InvalidConfig(
                "retry interval must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Protocol configuration handed to every node.
    pub fn synod_config(&self) -> SynodConfig {
        SynodConfig::default()
            .with_retry_interval(Duration::from_millis(self.protocol.retry_interval_ms))
            .with_crash_probability(self.protocol.crash_probability)
            .with_value_bias(self.protocol.value_bias)
    }

    /// Decision window.
    pub fn decision_window(&self) -> Duration {
        Duration::from_millis(self.decision_window_ms)
    }

    /// Observation window.
    pub fn observation_window(&self) -> Duration {
        Duration::from_millis(self.observation_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ClusterConfig::from_toml_str("").expect("valid");
        assert_eq!(config, ClusterConfig::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.synod_config(), SynodConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = ClusterConfig::from_toml_str(
            r#"
            nodes = 5
            faulty = 2
            seed = 7

            [protocol]
            crash_probability = 1.0
            "#,
        )
        .expect("valid");

        assert_eq!(config.nodes, 5);
        assert_eq!(config.faulty, 2);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.protocol.crash_probability, 1.0);
        assert_eq!(config.protocol.retry_interval_ms, 50);
        assert_eq!(config.decision_window(), Duration::from_secs(1));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ClusterConfig::from_toml_str("replicas = 3");
        assert!(matches!(result, Err(RunnerError::Toml(_))));
    }

    #[test]
    fn test_validation() {
        let config = ClusterConfig {
            nodes: 4,
            faulty: 2,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RunnerError::InvalidConfig(_))
        ));

        let mut config = ClusterConfig::default();
        config.protocol.value_bias = 2.0;
        assert!(config.validate().is_err());
    }
}
