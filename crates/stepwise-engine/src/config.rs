use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use stepwise_core::{ErrorInfo, Params, SimError};

/// YAML-configurable settings governing a simulation or experiment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of timesteps to simulate after the initial state.
    pub timesteps: usize,
    /// Repetitions per resolved configuration.
    #[serde(default = "default_runs")]
    pub runs: usize,
    /// Master seed and substream policy.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Worker pool settings.
    #[serde(default)]
    pub scheduler: Scheduler,
    /// Overrides merged into the model's base parameters.
    #[serde(default)]
    pub params: Params,
    /// Experiment members; empty means a single simulation.
    #[serde(default)]
    pub variants: Vec<Variant>,
}

fn default_runs() -> usize {
    1
}

impl RunConfig {
    /// Settings for a single sequential simulation.
    pub fn new(timesteps: usize, runs: usize) -> Self {
        Self {
            timesteps,
            runs,
            seed_policy: SeedPolicy::default(),
            scheduler: Scheduler::default(),
            params: Params::default(),
            variants: Vec::new(),
        }
    }

    /// Reads and validates a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SimError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        let config: RunConfig = serde_yaml::from_str(&contents).map_err(|err| {
            SimError::Config(
                ErrorInfo::new("config-parse", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants serde cannot express.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.runs == 0 {
            return Err(SimError::Config(
                ErrorInfo::new("zero-runs", "runs must be at least 1")
                    .with_hint("omit `runs` to use a single repetition"),
            ));
        }
        if self.scheduler.parallelism == 0 {
            return Err(SimError::Config(ErrorInfo::new(
                "zero-parallelism",
                "scheduler.parallelism must be at least 1",
            )));
        }
        self.params.resolve()?;
        for (index, variant) in self.variants.iter().enumerate() {
            self.params
                .merged(&variant.params)
                .resolve()
                .map_err(|err| err.with_context("variant", index))?;
        }
        Ok(())
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed every run seed is derived from.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label reported alongside results.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x05EE_D5EE_DD15_5EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// Scheduler configuration controlling how runs are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheduler {
    /// Worker threads; 1 runs everything on the calling thread.
    #[serde(default = "Scheduler::default_parallelism")]
    pub parallelism: usize,
}

impl Scheduler {
    const fn default_parallelism() -> usize {
        1
    }

    /// Scheduler using `parallelism` worker threads.
    pub fn parallel(parallelism: usize) -> Self {
        Self { parallelism }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            parallelism: Self::default_parallelism(),
        }
    }
}

/// One experiment member: a label and the overrides it applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Name reported next to the member's results.
    pub label: String,
    /// Overrides merged on top of the run-level parameters.
    #[serde(default)]
    pub params: Params,
}
