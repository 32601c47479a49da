use std::sync::Arc;

use stepwise_core::{ErrorInfo, Params, SimError, State};

use crate::block::UpdateBlock;
use crate::record::INDEX_COLUMNS;

/// Initial state, ordered update blocks and parameter set of a simulation.
///
/// Construction validates the wiring: no variable may shadow a record index
/// column, every update key must name a variable of the initial state and
/// the parameter set must resolve.
#[derive(Debug, Clone)]
pub struct Model {
    initial_state: State,
    blocks: Arc<[UpdateBlock]>,
    params: Params,
}

impl Model {
    /// Validates and assembles a model.
    pub fn new(
        initial_state: State,
        blocks: Vec<UpdateBlock>,
        params: Params,
    ) -> Result<Self, SimError> {
        if let Some(reserved) = initial_state.names().find(|name| INDEX_COLUMNS.contains(name)) {
            return Err(SimError::Model(
                ErrorInfo::new(
                    "reserved-variable",
                    "state variable collides with a record index column",
                )
                .with_context("variable", reserved)
                .with_hint("rename the variable; record index columns are reserved"),
            ));
        }
        for (index, block) in blocks.iter().enumerate() {
            for variable in block.variables() {
                if !initial_state.contains(variable) {
                    return Err(SimError::Model(
                        ErrorInfo::new(
                            "unknown-variable",
                            "update block targets a variable absent from the initial state",
                        )
                        .with_context("variable", variable)
                        .with_context("block", index)
                        .with_context("label", block.label())
                        .with_hint("declare the variable in the initial state"),
                    ));
                }
            }
        }
        params.resolve()?;
        Ok(Self {
            initial_state,
            blocks: blocks.into(),
            params,
        })
    }

    /// Returns a model sharing this model's state and blocks with
    /// `overrides` merged into its parameters.
    pub fn with_params(&self, overrides: &Params) -> Result<Self, SimError> {
        let params = self.params.merged(overrides);
        params.resolve()?;
        Ok(Self {
            initial_state: self.initial_state.clone(),
            blocks: Arc::clone(&self.blocks),
            params,
        })
    }

    /// The untouched initial state.
    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }

    /// Update blocks in execution order.
    pub fn blocks(&self) -> &[UpdateBlock] {
        &self.blocks
    }

    /// The (unresolved) parameter set.
    pub fn params(&self) -> &Params {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use stepwise_core::Value;

    use super::*;

    #[test]
    fn rejects_unknown_update_target() {
        let block = UpdateBlock::new("growth")
            .update("biomass", |_, _, _| Ok(("biomass".into(), Value::Float(1.0))));
        let err = Model::new(State::from_pairs([("height", 0.0)]), vec![block], Params::new())
            .unwrap_err();
        assert!(matches!(err, SimError::Model(_)));
        assert_eq!(err.info().context.get("variable").map(String::as_str), Some("biomass"));
    }

    #[test]
    fn rejects_variables_named_like_index_columns() {
        for reserved in INDEX_COLUMNS {
            let err = Model::new(
                State::from_pairs([("level", 0), (reserved, 0)]),
                Vec::new(),
                Params::new(),
            )
            .unwrap_err();
            assert!(matches!(err, SimError::Model(_)));
            assert_eq!(err.info().code, "reserved-variable");
            assert_eq!(err.info().context.get("variable").map(String::as_str), Some(reserved));
        }
    }

    #[test]
    fn rejects_empty_sweep_axis_up_front() {
        let params = Params::new().sweep("rate", Vec::<f64>::new());
        let err = Model::new(State::default(), Vec::new(), params).unwrap_err();
        assert_eq!(err.info().code, "empty-sweep-axis");
    }

    #[test]
    fn with_params_shares_blocks() {
        let model = Model::new(
            State::from_pairs([("x", 0)]),
            vec![UpdateBlock::new("noop")],
            Params::new().scalar("rate", 1),
        )
        .unwrap();
        let derived = model.with_params(&Params::new().sweep("rate", [2, 3])).unwrap();
        assert_eq!(derived.blocks().len(), 1);
        assert_eq!(derived.params().sweep_len(), 2);
        assert_eq!(model.params().sweep_len(), 1);
    }
}
