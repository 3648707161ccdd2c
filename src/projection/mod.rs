//! Projection engine for the two pension schemes

mod state;
mod engine;
mod records;

pub use state::{MonthFlows, ProjectionState};
pub use engine::{project, ProjectionEngine};
pub use records::{MonthlyRecord, ProjectionSeries, SeriesTotals};

/// Longest supported projection, in months after the lump-sum month (100 years)
pub const MAX_PROJECTION_MONTHS: usize = 1200;
