//! Projection inputs: the parameter set, per-scheme settings and their validation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::assumptions::{AnnualRate, Compounding};
use crate::calendar::YearMonth;
use crate::error::{ProjectionError, Result};

/// The two pension products being compared, named after the payout age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeId {
    #[serde(rename = "scheme58")]
    Age58,
    #[serde(rename = "scheme60")]
    Age60,
}

impl SchemeId {
    /// Age at which the scheme starts paying out
    pub fn payout_age(&self) -> u8 {
        match self {
            SchemeId::Age58 => 58,
            SchemeId::Age60 => 60,
        }
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scheme {}", self.payout_age())
    }
}

/// Per-scheme inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeParams {
    /// Gross monthly pension once payouts start
    pub pension_amount: f64,

    /// Payouts are made in this month and every month after
    pub pension_start_date: NaiveDate,

    /// Last month in which the monthly contribution is paid to the provider
    pub contribution_end_date: NaiveDate,

    /// Growth rate of the scheme's main account
    pub reinvestment_rate: AnnualRate,

    /// Growth rate of the separate SIP fund (Scheme 58 only)
    ///
    /// When set, monthly contributions that fall after the contribution end
    /// date and before the tax-free date are diverted into the SIP fund,
    /// which merges into the main account in the tax-free month.
    #[serde(default)]
    pub sip_growth_rate: Option<AnnualRate>,
}

impl SchemeParams {
    pub fn pension_start_month(&self) -> YearMonth {
        YearMonth::from_date(self.pension_start_date)
    }

    pub fn contribution_end_month(&self) -> YearMonth {
        YearMonth::from_date(self.contribution_end_date)
    }

    fn validate(&self, scheme: SchemeId, lump_sum_month: YearMonth) -> Result<()> {
        let prefix = match scheme {
            SchemeId::Age58 => "scheme58",
            SchemeId::Age60 => "scheme60",
        };

        check_amount(&format!("{prefix}.pension_amount"), self.pension_amount)?;
        check_rate(&format!("{prefix}.reinvestment_rate"), self.reinvestment_rate.rate)?;

        if let Some(sip) = &self.sip_growth_rate {
            if scheme != SchemeId::Age58 {
                return Err(ProjectionError::invalid(
                    format!("{prefix}.sip_growth_rate"),
                    "only Scheme 58 has a separate SIP fund",
                ));
            }
            check_rate(&format!("{prefix}.sip_growth_rate"), sip.rate)?;
        }

        if self.contribution_end_month() < lump_sum_month {
            return Err(ProjectionError::invalid(
                format!("{prefix}.contribution_end_date"),
                format!(
                    "contribution end {} precedes the lump sum month {}",
                    self.contribution_end_month(),
                    lump_sum_month
                ),
            ));
        }

        Ok(())
    }
}

/// All user-configured inputs for one comparison
///
/// Rates are fractions (0.07 = 7%). Any field missing from a config file
/// takes the dashboard's default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// One-time initial investment shared by both schemes
    #[serde(default = "default_lump_sum")]
    pub lump_sum: f64,

    #[serde(default = "default_lump_sum_date")]
    pub lump_sum_date: NaiveDate,

    #[serde(default = "default_monthly_contribution")]
    pub monthly_contribution: f64,

    #[serde(default = "default_scheme58")]
    pub scheme58: SchemeParams,

    #[serde(default = "default_scheme60")]
    pub scheme60: SchemeParams,

    #[serde(default = "default_true")]
    pub tax_enabled: bool,

    /// Flat tax rate on payouts made before the tax-free date
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,

    /// Month the holder turns 60; defaults to Scheme 60's pension start
    #[serde(default)]
    pub tax_free_from: Option<NaiveDate>,

    /// Also tax main-account growth credited before the tax-free date
    #[serde(default)]
    pub tax_on_growth: bool,
}

fn default_lump_sum() -> f64 { 5_500_000.0 }
fn default_monthly_contribution() -> f64 { 30_000.0 }
fn default_tax_rate() -> f64 { 0.30 }
fn default_true() -> bool { true }

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn default_lump_sum_date() -> NaiveDate { ymd(2025, 3, 1) }

fn default_scheme58() -> SchemeParams {
    SchemeParams {
        pension_amount: 85_000.0,
        pension_start_date: ymd(2026, 6, 1),
        contribution_end_date: ymd(2026, 5, 31),
        reinvestment_rate: AnnualRate::new(0.07, Compounding::Quarterly),
        sip_growth_rate: Some(AnnualRate::new(0.083, Compounding::Monthly)),
    }
}

fn default_scheme60() -> SchemeParams {
    SchemeParams {
        pension_amount: 127_000.0,
        pension_start_date: ymd(2028, 6, 1),
        contribution_end_date: ymd(2028, 5, 31),
        reinvestment_rate: AnnualRate::new(0.07, Compounding::Quarterly),
        sip_growth_rate: None,
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            lump_sum: default_lump_sum(),
            lump_sum_date: default_lump_sum_date(),
            monthly_contribution: default_monthly_contribution(),
            scheme58: default_scheme58(),
            scheme60: default_scheme60(),
            tax_enabled: true,
            tax_rate: default_tax_rate(),
            tax_free_from: None,
            tax_on_growth: false,
        }
    }
}

impl ParameterSet {
    /// Validate and return self, so a parameter set is checked where it is built
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Check every domain constraint the engine relies on
    pub fn validate(&self) -> Result<()> {
        check_amount("lump_sum", self.lump_sum)?;
        check_amount("monthly_contribution", self.monthly_contribution)?;

        if !self.tax_rate.is_finite() || !(0.0..=1.0).contains(&self.tax_rate) {
            return Err(ProjectionError::invalid(
                "tax_rate",
                format!("{} is outside 0..=1", self.tax_rate),
            ));
        }

        let lump_sum_month = self.lump_sum_month();
        self.scheme58.validate(SchemeId::Age58, lump_sum_month)?;
        self.scheme60.validate(SchemeId::Age60, lump_sum_month)?;

        Ok(())
    }

    pub fn scheme(&self, id: SchemeId) -> &SchemeParams {
        match id {
            SchemeId::Age58 => &self.scheme58,
            SchemeId::Age60 => &self.scheme60,
        }
    }

    pub fn lump_sum_month(&self) -> YearMonth {
        YearMonth::from_date(self.lump_sum_date)
    }

    /// First month in which payouts are no longer taxed
    pub fn tax_free_month(&self) -> YearMonth {
        let date = self.tax_free_from.unwrap_or(self.scheme60.pension_start_date);
        YearMonth::from_date(date)
    }

    /// Tax rate applicable to flows in `month`
    pub fn tax_rate_for(&self, month: YearMonth) -> f64 {
        if self.tax_enabled && month < self.tax_free_month() {
            self.tax_rate
        } else {
            0.0
        }
    }
}

fn check_amount(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ProjectionError::invalid(
            field,
            format!("{value} must be a non-negative amount"),
        ));
    }
    Ok(())
}

fn check_rate(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < -1.0 {
        return Err(ProjectionError::invalid(
            field,
            format!("{value} is below -100%"),
        ));
    }
    Ok(())
}
