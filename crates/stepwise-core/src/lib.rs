#![deny(missing_docs)]
#![doc = "Core data types for the stepwise simulation engine: scalar values, state snapshots, parameter sets with positional sweep resolution, the structured error type and deterministic seeding."]

pub mod errors;
pub mod params;
pub mod rng;
pub mod value;

pub use errors::{ErrorInfo, SimError};
pub use params::{Configuration, ParamValue, Params};
pub use rng::{derive_substream_seed, run_seed, RngHandle};
pub use value::{State, Value};
