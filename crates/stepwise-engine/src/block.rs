use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stepwise_core::{Configuration, RngHandle, SimError, State, Value};

/// Read-only view handed to decision and update functions.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    /// Resolved parameter configuration of the current run.
    pub params: &'a Configuration,
    /// Position of the executing block within the model.
    pub block_index: usize,
    /// Snapshots recorded so far in this run; `history[0]` is the initial state.
    pub history: &'a [State],
    /// Current state, including writes made earlier in the same block.
    pub state: &'a State,
}

/// Merged output of a block's decision functions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signals(IndexMap<String, Value>);

impl Signals {
    /// Creates an empty signal set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a signal, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Folds `other` into `self`; colliding names take `other`'s value.
    pub fn merge(&mut self, other: Signals) {
        for (name, value) in other.0 {
            self.0.insert(name, value);
        }
    }

    /// Returns the raw value of a signal.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Boolean signal; absent or non-boolean reads as `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Numeric signal with a fallback for absent or non-numeric entries.
    pub fn f64_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).and_then(Value::as_f64).unwrap_or(default)
    }

    /// Number of signals.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no signal was emitted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Signals {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Decision function: observes the context and emits signals.
pub type DecisionFn =
    Arc<dyn Fn(&StepContext<'_>, &mut RngHandle) -> Result<Signals, SimError> + Send + Sync>;

/// State-update function: returns the `(variable, new value)` pair to write.
pub type UpdateFn = Arc<
    dyn Fn(&StepContext<'_>, &Signals, &mut RngHandle) -> Result<(String, Value), SimError>
        + Send
        + Sync,
>;

/// One sequential stage of a timestep: decisions first, then updates.
///
/// Both maps keep declaration order, which is also execution order.
/// Registering a second function under an existing name replaces the first
/// in place.
#[derive(Clone, Default)]
pub struct UpdateBlock {
    label: String,
    decisions: IndexMap<String, DecisionFn>,
    updates: IndexMap<String, UpdateFn>,
}

impl UpdateBlock {
    /// Creates an empty block.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Registers a decision function.
    pub fn decision<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&StepContext<'_>, &mut RngHandle) -> Result<Signals, SimError>
            + Send
            + Sync
            + 'static,
    {
        self.decisions.insert(name.into(), Arc::new(f));
        self
    }

    /// Registers the update function for state variable `variable`.
    pub fn update<F>(mut self, variable: impl Into<String>, f: F) -> Self
    where
        F: Fn(&StepContext<'_>, &Signals, &mut RngHandle) -> Result<(String, Value), SimError>
            + Send
            + Sync
            + 'static,
    {
        self.updates.insert(variable.into(), Arc::new(f));
        self
    }

    /// Human readable label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Decision functions in execution order.
    pub fn decisions(&self) -> impl Iterator<Item = (&str, &DecisionFn)> {
        self.decisions.iter().map(|(name, f)| (name.as_str(), f))
    }

    /// Update functions in execution order, keyed by variable.
    pub fn updates(&self) -> impl Iterator<Item = (&str, &UpdateFn)> {
        self.updates.iter().map(|(name, f)| (name.as_str(), f))
    }

    /// Variables this block declares it updates.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.updates.keys().map(String::as_str)
    }
}

impl fmt::Debug for UpdateBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateBlock")
            .field("label", &self.label)
            .field("decisions", &self.decisions.keys().collect::<Vec<_>>())
            .field("updates", &self.updates.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_last_write_wins() {
        let mut merged = Signals::new().with("x", 1).with("y", true);
        merged.merge(Signals::new().with("x", 2));
        assert_eq!(merged.get("x"), Some(&Value::Int(2)));
        assert!(merged.flag("y"));
        assert!(!merged.flag("missing"));
        assert_eq!(merged.f64_or("missing", 4.5), 4.5);
    }

    #[test]
    fn re_registering_keeps_position() {
        let block = UpdateBlock::new("b")
            .update("a", |_, _, _| Ok(("a".into(), Value::Int(1))))
            .update("b", |_, _, _| Ok(("b".into(), Value::Int(1))))
            .update("a", |_, _, _| Ok(("a".into(), Value::Int(2))));
        let order: Vec<&str> = block.variables().collect();
        assert_eq!(order, vec!["a", "b"]);
    }
}
