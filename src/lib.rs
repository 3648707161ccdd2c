//! Pension Compare - month-by-month projection of two pension schemes
//!
//! This library provides:
//! - A validated parameter set for the two schemes (payouts from 58 vs 60)
//! - The projection engine: compound growth, contributions, SIP fund, payouts and tax
//! - A comparator for crossover detection, lead changes and ranking
//! - An explicit session object for interactive front ends

pub mod assumptions;
pub mod calendar;
pub mod comparison;
pub mod error;
pub mod params;
pub mod projection;
pub mod session;

// Re-export commonly used types
pub use calendar::YearMonth;
pub use comparison::{compare, BetterScheme, ComparisonSummary, OvertakeEvent};
pub use error::{ProjectionError, Result};
pub use params::{ParameterSet, SchemeId, SchemeParams};
pub use projection::{project, MonthlyRecord, ProjectionEngine, ProjectionSeries};
pub use session::{Dashboard, Navigation, Session};
