use std::sync::Arc;

use rayon::prelude::*;
use stepwise_core::{Configuration, ErrorInfo, SimError};
use tracing::{debug, debug_span, info, Span};

use crate::config::{RunConfig, Scheduler, SeedPolicy};
use crate::dataset::Dataset;
use crate::driver::{drive, RunCoords};
use crate::model::Model;
use crate::record::RunRecord;

/// A model replayed over every resolved configuration and repetition.
#[derive(Debug, Clone)]
pub struct Simulation {
    model: Arc<Model>,
    timesteps: usize,
    runs: usize,
    seed: u64,
    scheduler: Scheduler,
}

impl Simulation {
    /// Creates a sequential simulation seeded with the default master seed.
    pub fn new(model: impl Into<Arc<Model>>, timesteps: usize, runs: usize) -> Self {
        Self {
            model: model.into(),
            timesteps,
            runs,
            seed: SeedPolicy::default().master_seed,
            scheduler: Scheduler::default(),
        }
    }

    /// Creates a simulation from run settings.
    ///
    /// `config.params` and `config.variants` are not applied here; derive the
    /// model with [`Model::with_params`] first.
    pub fn from_config(model: impl Into<Arc<Model>>, config: &RunConfig) -> Self {
        Self::new(model, config.timesteps, config.runs)
            .with_seed(config.seed_policy.master_seed)
            .with_scheduler(config.scheduler)
    }

    /// Overrides the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Overrides the scheduler.
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// The simulated model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Timesteps per run.
    pub fn timesteps(&self) -> usize {
        self.timesteps
    }

    /// Repetitions per configuration.
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Runs every `(configuration, run)` pair and concatenates the records.
    ///
    /// Records are ordered by configuration, then run, then timestep, for any
    /// scheduler. The first failing run aborts the whole simulation.
    pub fn run(&self) -> Result<Dataset, SimError> {
        if self.runs == 0 {
            return Err(SimError::Config(
                ErrorInfo::new("zero-runs", "runs must be at least 1")
                    .with_context("timesteps", self.timesteps),
            ));
        }
        let configurations = self.model.params().resolve()?;
        let span = debug_span!(
            "simulation",
            configurations = configurations.len(),
            runs = self.runs,
            timesteps = self.timesteps,
            seed = self.seed,
        );
        let _guard = span.enter();

        let jobs: Vec<RunCoords> = (0..configurations.len())
            .flat_map(|subset| (1..=self.runs).map(move |run| RunCoords { subset, run }))
            .collect();

        let batches = if self.scheduler.parallelism > 1 {
            self.run_parallel(&configurations, &jobs, &span)?
        } else {
            jobs.iter()
                .map(|coords| self.run_one(&configurations, *coords))
                .collect::<Result<Vec<_>, SimError>>()?
        };

        let records: Vec<RunRecord> = batches.into_iter().flatten().collect();
        info!(
            records = records.len(),
            configurations = configurations.len(),
            runs = self.runs,
            "simulation complete"
        );
        Ok(Dataset::from_records(records))
    }

    fn run_parallel(
        &self,
        configurations: &[Configuration],
        jobs: &[RunCoords],
        span: &Span,
    ) -> Result<Vec<Vec<RunRecord>>, SimError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.scheduler.parallelism)
            .build()
            .map_err(|err| SimError::Scheduler(ErrorInfo::new("thread-pool", err.to_string())))?;
        pool.install(|| {
            jobs.par_iter()
                .map(|coords| {
                    let _guard = span.enter();
                    self.run_one(configurations, *coords)
                })
                .collect()
        })
    }

    fn run_one(
        &self,
        configurations: &[Configuration],
        coords: RunCoords,
    ) -> Result<Vec<RunRecord>, SimError> {
        if coords.run == 1 {
            debug!(subset = coords.subset, "starting configuration");
        }
        drive(
            &self.model,
            &configurations[coords.subset],
            coords,
            self.timesteps,
            self.seed,
        )
    }
}
