use stepwise_core::{Configuration, RngHandle, SimError, State};
use tracing::warn;

use crate::block::{Signals, StepContext, UpdateBlock};

/// Result of applying one block to a state.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Merged decision signals the updates observed.
    pub signals: Signals,
    /// State after every update of the block.
    pub state: State,
}

/// Applies `block` to `state`.
///
/// Decisions run in declaration order against the incoming state and their
/// outputs are merged last-write-wins. Updates then run in declaration order
/// and write in place, so each update observes the writes of the ones before
/// it. The write goes to the variable the update returns, which must exist
/// in the state. Errors from user functions are returned as-is with the block
/// and function name attached.
pub fn evaluate_block(
    block: &UpdateBlock,
    block_index: usize,
    params: &Configuration,
    history: &[State],
    mut state: State,
    rng: &mut RngHandle,
) -> Result<StepOutcome, SimError> {
    let mut signals = Signals::new();
    for (name, decide) in block.decisions() {
        let ctx = StepContext {
            params,
            block_index,
            history,
            state: &state,
        };
        let emitted = decide(&ctx, rng).map_err(|err| annotate(err, block, block_index, name))?;
        signals.merge(emitted);
    }

    for (variable, update) in block.updates() {
        let ctx = StepContext {
            params,
            block_index,
            history,
            state: &state,
        };
        let (target, value) =
            update(&ctx, &signals, rng).map_err(|err| annotate(err, block, block_index, variable))?;
        state
            .assign(&target, value)
            .map_err(|err| err.with_context("block", block_index))?;
    }

    Ok(StepOutcome { signals, state })
}

fn annotate(err: SimError, block: &UpdateBlock, block_index: usize, function: &str) -> SimError {
    warn!(
        block = block_index,
        label = block.label(),
        function,
        error = %err,
        "user function failed"
    );
    err.with_context("block", block_index)
        .with_context("function", function)
}

#[cfg(test)]
mod tests {
    use stepwise_core::{Params, Value};

    use super::*;

    fn params() -> Configuration {
        Params::new().resolve().unwrap().remove(0)
    }

    #[test]
    fn updates_see_earlier_writes_in_same_block() {
        let block = UpdateBlock::new("chain")
            .update("a", |ctx, _, _| Ok(("a".into(), Value::Int(ctx.state.i64("a")? + 1))))
            .update("b", |ctx, _, _| Ok(("b".into(), Value::Int(ctx.state.i64("a")? * 10))));
        let state = State::from_pairs([("a", 1), ("b", 0)]);
        let mut rng = RngHandle::from_seed(0);
        let outcome = evaluate_block(&block, 0, &params(), &[], state, &mut rng).unwrap();
        assert_eq!(outcome.state.get("a"), Some(&Value::Int(2)));
        assert_eq!(outcome.state.get("b"), Some(&Value::Int(20)));
    }

    #[test]
    fn returned_name_selects_the_target() {
        let block =
            UpdateBlock::new("alias").update("a", |_, _, _| Ok(("b".into(), Value::Int(7))));
        let state = State::from_pairs([("a", 0), ("b", 0)]);
        let mut rng = RngHandle::from_seed(0);
        let outcome = evaluate_block(&block, 0, &params(), &[], state, &mut rng).unwrap();
        assert_eq!(outcome.state.get("a"), Some(&Value::Int(0)));
        assert_eq!(outcome.state.get("b"), Some(&Value::Int(7)));
    }

    #[test]
    fn unknown_returned_name_is_a_model_error() {
        let block =
            UpdateBlock::new("bad").update("a", |_, _, _| Ok(("zeta".into(), Value::Int(1))));
        let state = State::from_pairs([("a", 0)]);
        let mut rng = RngHandle::from_seed(0);
        let err = evaluate_block(&block, 2, &params(), &[], state, &mut rng).unwrap_err();
        assert!(matches!(err, SimError::Model(_)));
        assert_eq!(err.info().code, "unknown-variable");
        assert_eq!(err.info().context.get("block").map(String::as_str), Some("2"));
    }

    #[test]
    fn user_errors_carry_location() {
        let block = UpdateBlock::new("faulty")
            .decision("probe", |_, _| Err(SimError::user("probe-offline", "no reading")));
        let mut rng = RngHandle::from_seed(0);
        let err = evaluate_block(&block, 3, &params(), &[], State::default(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, SimError::UserFn(_)));
        assert_eq!(err.info().context.get("block").map(String::as_str), Some("3"));
        assert_eq!(err.info().context.get("function").map(String::as_str), Some("probe"));
    }
}
