//! Parameter set: the validated user inputs for one comparison

mod data;
pub mod loader;

pub use data::{ParameterSet, SchemeId, SchemeParams};
pub use loader::{load_params, load_params_from_reader, load_params_or_default};
