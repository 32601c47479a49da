//! Scalar values and state snapshots.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, SimError};

/// A single scalar carried by state variables, parameters and signals.
///
/// Untagged so that YAML/JSON scalars deserialize directly: `true` becomes
/// [`Value::Bool`], `5` becomes [`Value::Int`] and `5.0` [`Value::Float`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Free form text.
    Str(String),
}

impl Value {
    /// Numeric view of the value. Integers widen, booleans map to 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Value::Str(_) => None,
        }
    }

    /// Integer view of the value. Floats are only accepted when integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Boolean view of the value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// String view of the value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

/// Snapshot of every simulated variable at one instant.
///
/// The key set is fixed by the initial state. [`State::assign`] overwrites
/// existing variables and rejects unknown names; there is no way to add or
/// remove a variable once the state exists. `Clone` is a full structural
/// copy, which is what keeps repetitions isolated from each other.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(IndexMap<String, Value>);

impl State {
    /// Builds a state from `(name, value)` pairs, preserving their order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Returns the value of a variable.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns the numeric value of a variable or a user-function error.
    pub fn f64(&self, name: &str) -> Result<f64, SimError> {
        self.get(name).and_then(Value::as_f64).ok_or_else(|| {
            SimError::UserFn(
                ErrorInfo::new("state-type", "state variable is missing or not numeric")
                    .with_context("variable", name),
            )
        })
    }

    /// Returns the integer value of a variable or a user-function error.
    pub fn i64(&self, name: &str) -> Result<i64, SimError> {
        self.get(name).and_then(Value::as_i64).ok_or_else(|| {
            SimError::UserFn(
                ErrorInfo::new("state-type", "state variable is missing or not an integer")
                    .with_context("variable", name),
            )
        })
    }

    /// Returns the boolean value of a variable or a user-function error.
    pub fn bool(&self, name: &str) -> Result<bool, SimError> {
        self.get(name).and_then(Value::as_bool).ok_or_else(|| {
            SimError::UserFn(
                ErrorInfo::new("state-type", "state variable is missing or not a boolean")
                    .with_context("variable", name),
            )
        })
    }

    /// Whether the state declares a variable with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Overwrites an existing variable.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), SimError> {
        match self.0.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(SimError::Model(
                ErrorInfo::new(
                    "unknown-variable",
                    "update wrote a variable absent from the initial state",
                )
                .with_context("variable", name)
                .with_hint("declare the variable in the initial state"),
            )),
        }
    }

    /// Iterates variables in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Iterates variable names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the state has no variables.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
