#![deny(missing_docs)]

//! Deterministic discrete-time simulation engine.
//!
//! A [`Model`] holds an initial [`State`](stepwise_core::State), ordered
//! [`UpdateBlock`]s and a [`Params`](stepwise_core::Params) set whose sweep
//! axes resolve positionally into configurations. A [`Simulation`] replays
//! the model for every configuration and repetition; an [`Experiment`] runs
//! several simulations and tags their rows for A/B analysis.

/// Update blocks, decision signals and the function types they hold.
pub mod block;
/// YAML run configuration.
pub mod config;
pub mod dataset;
/// Run driver for one `(configuration, run)` pair.
pub mod driver;
/// Transition step evaluator.
pub mod evaluator;
/// Multi-simulation experiments.
pub mod experiment;
/// Validated model definition.
pub mod model;
/// Dataset rows.
pub mod record;
/// Configuration x repetition orchestration.
pub mod simulation;

pub use block::{DecisionFn, Signals, StepContext, UpdateBlock, UpdateFn};
pub use config::{RunConfig, Scheduler, SeedPolicy, Variant};
pub use dataset::{compare, Comparison, Dataset, Objective, SubsetSummary, Winner};
pub use driver::{drive, RunCoords};
pub use evaluator::{evaluate_block, StepOutcome};
pub use experiment::{ab_test, Experiment};
pub use model::Model;
pub use record::{RunRecord, INDEX_COLUMNS};
pub use simulation::Simulation;
