use stepwise_core::{Params, SimError};
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::model::Model;
use crate::simulation::Simulation;

/// Independently configured simulations run back to back for comparison.
#[derive(Debug, Clone, Default)]
pub struct Experiment {
    simulations: Vec<Simulation>,
    labels: Vec<String>,
}

impl Experiment {
    /// Creates an experiment; members are labelled `sim-0`, `sim-1`, ...
    pub fn new(simulations: Vec<Simulation>) -> Self {
        let labels = (0..simulations.len()).map(|idx| format!("sim-{idx}")).collect();
        Self {
            simulations,
            labels,
        }
    }

    /// Replaces member labels. Missing labels keep their defaults.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (slot, label) in self.labels.iter_mut().zip(labels) {
            *slot = label.into();
        }
        self
    }

    /// Member labels in run order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Runs every member and concatenates their datasets.
    ///
    /// Each record's `simulation` field is set to the member's position.
    /// A failing member aborts the experiment.
    pub fn run(&self) -> Result<Dataset, SimError> {
        let mut combined = Dataset::default();
        for (index, simulation) in self.simulations.iter().enumerate() {
            debug!(simulation = index, label = %self.labels[index], "starting member");
            let records = simulation
                .run()
                .map_err(|err| err.with_context("simulation", index))?
                .into_records()
                .into_iter()
                .map(|mut record| {
                    record.simulation = index;
                    record
                })
                .collect();
            combined.extend(Dataset::from_records(records));
        }
        info!(
            members = self.simulations.len(),
            records = combined.len(),
            "experiment complete"
        );
        Ok(combined)
    }
}

/// Runs `model` under two sets of overrides and returns each side's rows.
///
/// Both members share `seed`, so variants are compared on common random
/// numbers.
pub fn ab_test(
    model: &Model,
    params_a: &Params,
    params_b: &Params,
    timesteps: usize,
    runs: usize,
    seed: u64,
) -> Result<(Dataset, Dataset), SimError> {
    let sim_a = Simulation::new(model.with_params(params_a)?, timesteps, runs).with_seed(seed);
    let sim_b = Simulation::new(model.with_params(params_b)?, timesteps, runs).with_seed(seed);
    let dataset = Experiment::new(vec![sim_a, sim_b])
        .with_labels(["a", "b"])
        .run()?;
    Ok((dataset.for_simulation(0), dataset.for_simulation(1)))
}
