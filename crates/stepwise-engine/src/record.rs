use serde::{Deserialize, Serialize};
use stepwise_core::State;

/// Column names a record reserves for its coordinates.
pub const INDEX_COLUMNS: [&str; 5] = ["simulation", "subset", "run", "substep", "timestep"];

/// One dataset row: a state snapshot and its five index coordinates.
///
/// Serializes flat, index columns first and state variables after them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Position of the owning simulation within an experiment (0 otherwise).
    pub simulation: usize,
    /// Index of the resolved parameter configuration.
    pub subset: usize,
    /// 1-indexed repetition within the configuration.
    pub run: usize,
    /// Always 0; intra-block sub-stepping is not modelled.
    pub substep: usize,
    /// 0 for the initial state, then 1..=T.
    pub timestep: usize,
    /// Variables at this timestep.
    #[serde(flatten)]
    pub state: State,
}
