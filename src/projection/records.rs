//! Projection output: monthly records and per-scheme series

use serde::Serialize;

use crate::calendar::YearMonth;
use crate::error::{ProjectionError, Result};
use crate::params::SchemeId;

/// Account state for one scheme at the end of one month
///
/// balance = previous balance + contribution + growth - payout - tax_deducted
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyRecord {
    /// Months since the lump-sum month (0 = opening record)
    pub month_index: usize,
    pub date: YearMonth,

    // Flows for the month
    pub contribution: f64,
    /// Growth credited on the prior month's balances (main account and SIP fund)
    pub growth: f64,
    /// Pension paid out net of tax
    pub payout: f64,
    /// pension_tax + growth_tax
    pub tax_deducted: f64,
    pub pension_tax: f64,
    pub growth_tax: f64,

    // End-of-month state
    /// Total value: main account plus SIP fund
    pub balance: f64,
    pub sip_balance: f64,
    /// Lump sum plus every monthly contribution so far
    pub cumulative_contributions: f64,
    /// Net payouts so far
    pub cumulative_payouts: f64,
    pub cumulative_tax: f64,

    // Reinvestment pot: net pensions received, compounding at the reinvestment rate
    pub reinvested_value: f64,
    /// Gross interest credited to the pot this month
    pub reinvestment_interest: f64,
    /// Tax on this month's pot interest
    pub reinvestment_tax: f64,
    /// Pot interest so far, net of tax
    pub cumulative_reinvestment_interest: f64,
}

impl MonthlyRecord {
    /// Record with no flows, holding `balance` (the lump-sum month)
    pub fn opening(date: YearMonth, balance: f64) -> Self {
        Self {
            month_index: 0,
            date,
            contribution: 0.0,
            growth: 0.0,
            payout: 0.0,
            tax_deducted: 0.0,
            pension_tax: 0.0,
            growth_tax: 0.0,
            balance,
            sip_balance: 0.0,
            cumulative_contributions: balance,
            cumulative_payouts: 0.0,
            cumulative_tax: 0.0,
            reinvested_value: 0.0,
            reinvestment_interest: 0.0,
            reinvestment_tax: 0.0,
            cumulative_reinvestment_interest: 0.0,
        }
    }

    /// Pension before tax
    pub fn gross_payout(&self) -> f64 {
        self.payout + self.pension_tax
    }

    /// Balance in the main account, excluding the SIP fund
    pub fn main_balance(&self) -> f64 {
        self.balance - self.sip_balance
    }
}

/// Summary totals over a whole series
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SeriesTotals {
    pub final_value: f64,
    pub total_contributions: f64,
    pub total_growth: f64,
    pub total_payouts: f64,
    /// Tax withheld from the account: pension tax plus growth tax
    pub total_tax: f64,
    pub total_pension_tax: f64,
    pub total_growth_tax: f64,
    /// Reinvestment pot at the end of the series
    pub final_reinvested_value: f64,
    /// Interest earned by the reinvestment pot, net of tax
    pub total_reinvestment_interest: f64,
    pub total_reinvestment_tax: f64,
}

impl SeriesTotals {
    /// Every tax paid: on pensions, account growth and pot interest
    pub fn all_tax(&self) -> f64 {
        self.total_tax + self.total_reinvestment_tax
    }
}

/// Chronological monthly records for one scheme, indexed from the lump-sum month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionSeries {
    scheme: SchemeId,
    records: Vec<MonthlyRecord>,
}

impl ProjectionSeries {
    pub(crate) fn new(scheme: SchemeId, records: Vec<MonthlyRecord>) -> Self {
        Self { scheme, records }
    }

    /// Build a series from externally produced records
    ///
    /// Records must be consecutive calendar months with `month_index`
    /// counting up from 0.
    pub fn from_records(scheme: SchemeId, records: Vec<MonthlyRecord>) -> Result<Self> {
        for (idx, record) in records.iter().enumerate() {
            if record.month_index != idx {
                return Err(ProjectionError::invalid(
                    "records",
                    format!("record {idx} has month_index {}", record.month_index),
                ));
            }
        }
        for pair in records.windows(2) {
            if pair[1].date != pair[0].date.succ() {
                return Err(ProjectionError::invalid(
                    "records",
                    format!("{} does not follow {}", pair[1].date, pair[0].date),
                ));
            }
        }
        Ok(Self::new(scheme, records))
    }

    pub fn scheme(&self) -> SchemeId {
        self.scheme
    }

    pub fn records(&self) -> &[MonthlyRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MonthlyRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn start(&self) -> Option<YearMonth> {
        self.records.first().map(|r| r.date)
    }

    pub fn get(&self, month_index: usize) -> Option<&MonthlyRecord> {
        self.records.get(month_index)
    }

    /// Record for a calendar month, if the series covers it
    pub fn at(&self, month: YearMonth) -> Option<&MonthlyRecord> {
        let start = self.start()?;
        let offset = month.months_since(start);
        usize::try_from(offset).ok().and_then(|idx| self.records.get(idx))
    }

    pub fn final_record(&self) -> Option<&MonthlyRecord> {
        self.records.last()
    }

    /// Balance in the last month, or zero for an empty series
    pub fn final_balance(&self) -> f64 {
        self.final_record().map(|r| r.balance).unwrap_or(0.0)
    }

    pub fn totals(&self) -> SeriesTotals {
        let Some(last) = self.final_record() else {
            return SeriesTotals::default();
        };
        SeriesTotals {
            final_value: last.balance,
            total_contributions: last.cumulative_contributions,
            total_growth: self.records.iter().map(|r| r.growth).sum(),
            total_payouts: last.cumulative_payouts,
            total_tax: last.cumulative_tax,
            total_pension_tax: self.records.iter().map(|r| r.pension_tax).sum(),
            total_growth_tax: self.records.iter().map(|r| r.growth_tax).sum(),
            final_reinvested_value: last.reinvested_value,
            total_reinvestment_interest: last.cumulative_reinvestment_interest,
            total_reinvestment_tax: self.records.iter().map(|r| r.reinvestment_tax).sum(),
        }
    }
}

impl<'a> IntoIterator for &'a ProjectionSeries {
    type Item = &'a MonthlyRecord;
    type IntoIter = std::slice::Iter<'a, MonthlyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
