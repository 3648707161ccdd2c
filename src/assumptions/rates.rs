//! Annual-to-monthly rate conversion

use serde::{Deserialize, Serialize};
use std::fmt;

/// How often a nominal annual rate compounds within a year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Compounding {
    Daily,
    Monthly,
    Quarterly,
    /// The annual rate is already effective; this is the default
    #[default]
    Annually,
}

impl Compounding {
    /// Compounding periods per year
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Compounding::Daily => 365,
            Compounding::Monthly => 12,
            Compounding::Quarterly => 4,
            Compounding::Annually => 1,
        }
    }

    /// Effective annual rate for a nominal annual rate compounded at this frequency
    pub fn effective_annual_rate(&self, nominal_annual_rate: f64) -> f64 {
        let n = self.periods_per_year() as f64;
        (1.0 + nominal_annual_rate / n).powf(n) - 1.0
    }

    /// Effective monthly rate: (1 + effective annual)^(1/12) - 1
    pub fn monthly_rate(&self, nominal_annual_rate: f64) -> f64 {
        if nominal_annual_rate == 0.0 {
            return 0.0;
        }
        let effective = self.effective_annual_rate(nominal_annual_rate);
        (1.0 + effective).powf(1.0 / 12.0) - 1.0
    }
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compounding::Daily => "Daily",
            Compounding::Monthly => "Monthly",
            Compounding::Quarterly => "Quarterly",
            Compounding::Annually => "Annually",
        };
        f.write_str(name)
    }
}

/// An annual rate together with its compounding convention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualRate {
    /// Annual rate as a fraction (0.07 = 7%)
    pub rate: f64,
    #[serde(default)]
    pub compounding: Compounding,
}

impl AnnualRate {
    pub fn new(rate: f64, compounding: Compounding) -> Self {
        Self { rate, compounding }
    }

    /// Rate already expressed as an effective annual rate
    pub fn effective(rate: f64) -> Self {
        Self::new(rate, Compounding::Annually)
    }

    pub fn monthly(&self) -> f64 {
        self.compounding.monthly_rate(self.rate)
    }
}
