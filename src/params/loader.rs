//! Load a parameter set from JSON

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::ParameterSet;
use crate::error::Result;

/// Load and validate a parameter set from a JSON file
pub fn load_params<P: AsRef<Path>>(path: P) -> Result<ParameterSet> {
    let path = path.as_ref();
    log::info!("Loading parameters from {}", path.display());
    let file = File::open(path)?;
    load_params_from_reader(BufReader::new(file))
}

/// Load and validate a parameter set from any JSON reader
pub fn load_params_from_reader<R: Read>(reader: R) -> Result<ParameterSet> {
    let params: ParameterSet = serde_json::from_reader(reader)?;
    params.validated()
}

/// Load from `path` when given, otherwise fall back to the dashboard defaults
pub fn load_params_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<ParameterSet> {
    match path {
        Some(path) => load_params(path),
        None => {
            log::debug!("No parameter file given, using defaults");
            ParameterSet::default().validated()
        }
    }
}
