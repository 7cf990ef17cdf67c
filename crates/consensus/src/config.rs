//! Protocol configuration.

use std::time::Duration;

/// Configuration for a Synod node.
#[derive(Clone, Debug, PartialEq)]
pub struct SynodConfig {
    /// Period of the retry timer that re-drives an aborted proposal.
    pub retry_interval: Duration,

    /// Probability that a fault-prone node crashes on any inbound event.
    pub crash_probability: f64,

    /// Probability that `Launch` draws the value `1` rather than `0`.
    pub value_bias: f64,
}

impl Default for SynodConfig {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_millis(50),
            crash_probability: 0.2,
            value_bias: 0.5,
        }
    }
}

impl SynodConfig {
    /// Set the retry timer period.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Set the per-event crash probability of fault-prone nodes.
    pub fn with_crash_probability(mut self, probability: f64) -> Self {
        self.crash_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Set the probability of launching with value `1`.
    pub fn with_value_bias(mut self, bias: f64) -> Self {
        self.value_bias = bias.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SynodConfig::default();
        assert_eq!(config.retry_interval, Duration::from_millis(50));
        assert_eq!(config.crash_probability, 0.2);
        assert_eq!(config.value_bias, 0.5);
    }

    #[test]
    fn test_builders_clamp() {
        let config = SynodConfig::default()
            .with_crash_probability(1.5)
            .with_value_bias(-0.1)
            .with_retry_interval(Duration::from_millis(10));
        assert_eq!(config.crash_probability, 1.0);
        assert_eq!(config.value_bias, 0.0);
        assert_eq!(config.retry_interval, Duration::from_millis(10));
    }
}
