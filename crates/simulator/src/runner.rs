//! Experiment runner.
//!
//! Drives the crash-and-hold scenario on the deterministic simulation:
//! every node competes during the decision window, then all but one leader
//! are held for the observation window.

use crate::config::{ConfigError, ExperimentConfig};
use crate::report::ExperimentReport;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use synod_core::Event;
use synod_simulation::SimulationRunner;
use synod_types::ProcessId;
use tracing::info;

/// One crash-and-hold experiment.
pub struct Experiment {
    /// Underlying deterministic simulation runner.
    runner: SimulationRunner,

    /// Configuration.
    config: ExperimentConfig,

    /// RNG for the driver's own choices (separate from the simulation RNG).
    rng: ChaCha8Rng,
}

impl Experiment {
    /// Create an experiment, rejecting invalid configurations.
    pub fn new(config: ExperimentConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let runner =
            SimulationRunner::new(config.to_network_config(), config.synod.clone(), config.seed);
        let rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(1));

        info!(
            nodes = config.num_nodes,
            faulty = config.num_faulty,
            seed = config.seed,
            "Experiment created"
        );

        Ok(Self {
            runner,
            config,
            rng,
        })
    }

    /// Run the experiment to completion.
    pub fn run(mut self) -> ExperimentReport {
        let directory = self.runner.directory().clone();
        self.runner.send_control_all(Event::DirectoryReceived {
            directory: directory.clone(),
        });

        let mut order: Vec<ProcessId> = directory.iter().collect();
        order.shuffle(&mut self.rng);

        let crashed: Vec<ProcessId> = order[..self.config.num_faulty].to_vec();
        for &id in &crashed {
            self.runner.send_control(id, Event::CrashSignal);
        }
        info!(crashed = ?crashed, "Crash signals sent");

        let start = self.runner.now();
        self.runner.send_control_all(Event::StartClock { at: start });
        self.runner.send_control_all(Event::LaunchReceived);
        self.runner.run_for(self.config.decision_window);

        let leader = order[self.config.num_faulty];
        for &id in order.iter().filter(|&&id| id != leader) {
            self.runner.send_control(id, Event::HoldSignal);
        }
        info!(leader = %leader, now = ?self.runner.now(), "Holding every node but the leader");

        self.runner.run_for(self.config.observation_window);

        let silent = self
            .runner
            .nodes()
            .iter()
            .filter(|node| node.is_silent() && node.decision().is_none())
            .map(|node| node.id())
            .collect();

        let report = ExperimentReport {
            leader,
            crashed,
            silent,
            decisions: self.runner.decisions().to_vec(),
            stats: self.runner.stats().clone(),
            elapsed: self.runner.now() - start,
        };

        info!(
            decisions = report.decisions.len(),
            agreement = report.agreement(),
            "Experiment complete"
        );
        report
    }
}
