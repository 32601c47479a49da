//! Parameter sets and positional sweep resolution.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, SimError};
use crate::value::Value;

/// One entry of a parameter set: a fixed scalar or an ordered sweep axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Candidate values, one per resolved configuration.
    Sweep(Vec<Value>),
    /// Value shared by every configuration.
    Scalar(Value),
}

impl ParamValue {
    /// Value contributed to configuration `index`.
    ///
    /// Shorter axes clamp to their last element. Returns `None` only for an
    /// empty axis.
    fn at(&self, index: usize) -> Option<&Value> {
        match self {
            ParamValue::Scalar(value) => Some(value),
            ParamValue::Sweep(values) => values.get(index.min(values.len().checked_sub(1)?)),
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::Scalar(value)
    }
}

/// Ordered parameter set that may mix scalars and sweep axes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(IndexMap<String, ParamValue>);

impl Params {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a scalar parameter.
    pub fn scalar(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), ParamValue::Scalar(value.into()));
        self
    }

    /// Adds (or replaces) a sweep axis.
    pub fn sweep<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.0.insert(name.into(), ParamValue::Sweep(values));
        self
    }

    /// Returns the entry stored under `name`.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy of `self` with `overrides` applied.
    ///
    /// Overridden entries keep their original position; new entries are
    /// appended in the order they appear in `overrides`.
    pub fn merged(&self, overrides: &Params) -> Params {
        let mut merged = self.clone();
        for (name, value) in &overrides.0 {
            merged.0.insert(name.clone(), value.clone());
        }
        merged
    }

    /// Number of configurations [`Params::resolve`] produces.
    ///
    /// The length of the longest sweep axis, or 1 when there is none.
    pub fn sweep_len(&self) -> usize {
        self.0
            .values()
            .filter_map(|value| match value {
                ParamValue::Sweep(values) => Some(values.len()),
                ParamValue::Scalar(_) => None,
            })
            .max()
            .unwrap_or(1)
    }

    /// Expands sweep axes into concrete configurations.
    ///
    /// Axes are zipped positionally, not crossed: configuration `i` takes
    /// `axis[min(i, axis.len() - 1)]` from every axis. Callers that want a
    /// cartesian product must expand it themselves. An empty axis has no
    /// value to clamp to and is rejected.
    pub fn resolve(&self) -> Result<Vec<Configuration>, SimError> {
        if let Some((name, _)) = self
            .0
            .iter()
            .find(|(_, value)| matches!(value, ParamValue::Sweep(values) if values.is_empty()))
        {
            return Err(SimError::Params(
                ErrorInfo::new("empty-sweep-axis", "sweep axis has no candidate values")
                    .with_context("parameter", name)
                    .with_hint("use a scalar or give the axis at least one candidate"),
            ));
        }

        let count = self.sweep_len();
        let mut configurations = Vec::with_capacity(count);
        for index in 0..count {
            let mut resolved = IndexMap::with_capacity(self.0.len());
            for (name, value) in &self.0 {
                if let Some(value) = value.at(index) {
                    resolved.insert(name.clone(), value.clone());
                }
            }
            configurations.push(Configuration(resolved));
        }
        Ok(configurations)
    }
}

impl<K: Into<String>> FromIterator<(K, ParamValue)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, ParamValue)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// One fully scalar parameter assignment (a "subset").
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(IndexMap<String, Value>);

impl Configuration {
    /// Returns the raw value of a parameter.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Iterates parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the configuration has no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn require(&self, name: &str) -> Result<&Value, SimError> {
        self.0.get(name).ok_or_else(|| {
            SimError::Params(
                ErrorInfo::new("missing-parameter", "parameter is not defined")
                    .with_context("parameter", name),
            )
        })
    }

    fn typed<T>(
        &self,
        name: &str,
        expected: &str,
        view: impl FnOnce(&Value) -> Option<T>,
    ) -> Result<T, SimError> {
        let value = self.require(name)?;
        view(value).ok_or_else(|| {
            SimError::Params(
                ErrorInfo::new("parameter-type", "parameter has an unexpected type")
                    .with_context("parameter", name)
                    .with_context("expected", expected)
                    .with_context("found", value.kind()),
            )
        })
    }

    /// Numeric parameter (integers widen).
    pub fn f64(&self, name: &str) -> Result<f64, SimError> {
        self.typed(name, "number", Value::as_f64)
    }

    /// Integer parameter.
    pub fn i64(&self, name: &str) -> Result<i64, SimError> {
        self.typed(name, "int", Value::as_i64)
    }

    /// Boolean parameter.
    pub fn bool(&self, name: &str) -> Result<bool, SimError> {
        self.typed(name, "bool", Value::as_bool)
    }

    /// String parameter.
    pub fn str(&self, name: &str) -> Result<&str, SimError> {
        let value = self.require(name)?;
        value.as_str().ok_or_else(|| {
            SimError::Params(
                ErrorInfo::new("parameter-type", "parameter has an unexpected type")
                    .with_context("parameter", name)
                    .with_context("expected", "string")
                    .with_context("found", value.kind()),
            )
        })
    }
}
