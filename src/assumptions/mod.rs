//! Rate conventions shared by the scheme projections

mod rates;

pub use rates::{AnnualRate, Compounding};
