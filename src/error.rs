//! Error taxonomy for parameter validation, projection and comparison

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectionError {
    /// Bad date ordering, out-of-range rate or amount, or an as-of date
    /// outside the projection horizon
    #[error("Invalid parameter '{field}': {reason}")]
    InvalidParameter { field: String, reason: String },

    /// Two series that should share a month axis do not
    #[error("Mismatched series: scheme 58 has {scheme58_len} months, scheme 60 has {scheme60_len}")]
    MismatchedSeries { scheme58_len: usize, scheme60_len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl ProjectionError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ProjectionError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
