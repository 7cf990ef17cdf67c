//! Experiment results.

use std::collections::BTreeSet;
use std::time::Duration;
use synod_simulation::{DecisionRecord, SimulationStats};
use synod_types::{ProcessId, Value};

/// Outcome of one experiment.
#[derive(Debug, Clone)]
pub struct ExperimentReport {
    /// The node left un-held after the decision window.
    pub leader: ProcessId,
    /// Nodes sent a crash signal.
    pub crashed: Vec<ProcessId>,
    /// Nodes that fell silent without deciding.
    pub silent: Vec<ProcessId>,
    /// Every decision, in emission order.
    pub decisions: Vec<DecisionRecord>,
    /// Simulation statistics.
    pub stats: SimulationStats,
    /// Simulated time from the start clock to the end of the run.
    pub elapsed: Duration,
}

impl ExperimentReport {
    /// Distinct decided values.
    pub fn decided_values(&self) -> BTreeSet<Value> {
        self.decisions.iter().map(|d| d.value).collect()
    }

    /// Whether no two nodes decided differently.
    pub fn agreement(&self) -> bool {
        self.decided_values().len() <= 1
    }

    /// The decided value, if anyone decided and all agree.
    pub fn decided_value(&self) -> Option<Value> {
        let values = self.decided_values();
        match values.len() {
            1 => values.into_iter().next(),
            _ => None,
        }
    }

    /// Earliest decision latency.
    pub fn first_decision_latency(&self) -> Option<Duration> {
        self.decisions.iter().map(|d| d.latency).min()
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n═══════════════════════════════════════════");
        println!("            EXPERIMENT REPORT              ");
        println!("═══════════════════════════════════════════");
        println!();
        println!("Nodes:");
        println!("  Leader:   {}", self.leader);
        println!("  Crashed:  {}", join(&self.crashed));
        println!("  Silent:   {}", join(&self.silent));
        println!();
        println!("Decisions:");
        for d in &self.decisions {
            println!(
                "  {} decided {} (ballot {}) after {:?}",
                d.node, d.value, d.ballot, d.latency
            );
        }
        match self.decided_value() {
            Some(value) => println!("  Agreement on {}", value),
            None if self.decisions.is_empty() => println!("  No decision"),
            None => println!("  DISAGREEMENT: {:?}", self.decided_values()),
        }
        println!();
        println!("Messages:");
        for (kind, count) in &self.stats.messages_by_type {
            println!("  {:<14} {}", kind, count);
        }
        println!("  Total:         {}", self.stats.messages_sent);
        println!();
        println!("Elapsed: {:?}", self.elapsed);
    }
}

fn join(ids: &[ProcessId]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use synod_types::Ballot;

    fn decision(node: u32, value: u64) -> DecisionRecord {
        DecisionRecord {
            node: ProcessId(node),
            value: Value(value),
            ballot: Ballot(node as i64),
            latency: Duration::from_millis(u64::from(node) * 10),
            at: Duration::from_millis(u64::from(node) * 10),
        }
    }

    fn report(decisions: Vec<DecisionRecord>) -> ExperimentReport {
        ExperimentReport {
            leader: ProcessId(1),
            crashed: vec![],
            silent: vec![],
            decisions,
            stats: SimulationStats::default(),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_agreement() {
        let agreed = report(vec![decision(1, 1), decision(2, 1)]);
        assert!(agreed.agreement());
        assert_eq!(agreed.decided_value(), Some(Value::ONE));
        assert_eq!(
            agreed.first_decision_latency(),
            Some(Duration::from_millis(10))
        );

        let split = report(vec![decision(1, 0), decision(2, 1)]);
        assert!(!split.agreement());
        assert_eq!(split.decided_value(), None);

        let empty = report(vec![]);
        assert!(empty.agreement());
        assert_eq!(empty.decided_value(), None);
    }
}
