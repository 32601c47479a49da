use stepwise_core::{run_seed, Configuration, RngHandle, SimError};
use tracing::trace;

use crate::evaluator::evaluate_block;
use crate::model::Model;
use crate::record::RunRecord;

/// Coordinates of one repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunCoords {
    /// Index of the resolved parameter configuration.
    pub subset: usize,
    /// 1-indexed repetition number.
    pub run: usize,
}

/// Replays the model for one `(configuration, run)` pair.
///
/// Emits `timesteps + 1` records. Record 0 is a copy of the initial state;
/// every later record is the state after all blocks ran once, in order.
/// The run starts from its own clone of the initial state and draws from its
/// own RNG seeded by `(master_seed, subset, run)`, so runs never observe each
/// other.
pub fn drive(
    model: &Model,
    params: &Configuration,
    coords: RunCoords,
    timesteps: usize,
    master_seed: u64,
) -> Result<Vec<RunRecord>, SimError> {
    let mut rng = RngHandle::from_seed(run_seed(master_seed, coords.subset, coords.run));
    let mut history = Vec::with_capacity(timesteps + 1);
    history.push(model.initial_state().clone());

    for timestep in 1..=timesteps {
        let mut state = history[timestep - 1].clone();
        for (block_index, block) in model.blocks().iter().enumerate() {
            state = evaluate_block(block, block_index, params, &history, state, &mut rng)
                .map_err(|err| {
                    err.with_context("subset", coords.subset)
                        .with_context("run", coords.run)
                        .with_context("timestep", timestep)
                })?
                .state;
        }
        trace!(subset = coords.subset, run = coords.run, timestep, "timestep complete");
        history.push(state);
    }

    Ok(history
        .into_iter()
        .enumerate()
        .map(|(timestep, state)| RunRecord {
            simulation: 0,
            subset: coords.subset,
            run: coords.run,
            substep: 0,
            timestep,
            state,
        })
        .collect())
}
