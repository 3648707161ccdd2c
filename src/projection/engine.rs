//! Month-by-month projection of both schemes

use crate::calendar::YearMonth;
use crate::error::{ProjectionError, Result};
use crate::params::{ParameterSet, SchemeId, SchemeParams};

use super::records::{MonthlyRecord, ProjectionSeries};
use super::state::{MonthFlows, ProjectionState};
use super::MAX_PROJECTION_MONTHS;

/// Monthly rates derived once per projection
#[derive(Debug, Clone, Copy)]
struct MonthlyRates {
    main: f64,
    /// Present only for a scheme with a separate SIP fund
    sip: Option<f64>,
}

impl MonthlyRates {
    fn for_scheme(scheme: &SchemeParams) -> Self {
        Self {
            main: scheme.reinvestment_rate.monthly(),
            sip: scheme.sip_growth_rate.map(|r| r.monthly()),
        }
    }
}

/// Projects a validated parameter set up to any as-of month
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    params: ParameterSet,
}

impl ProjectionEngine {
    /// Fails with `InvalidParameter` if the parameter set is not valid
    pub fn new(params: ParameterSet) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Number of months after the lump-sum month covered up to `as_of`
    pub fn horizon_months(&self, as_of: YearMonth) -> Result<usize> {
        let start = self.params.lump_sum_month();
        let months = as_of.months_since(start);
        if months < 0 {
            return Err(ProjectionError::invalid(
                "as_of_date",
                format!("{as_of} precedes the lump sum month {start}"),
            ));
        }
        let months = months as usize;
        if months > MAX_PROJECTION_MONTHS {
            return Err(ProjectionError::invalid(
                "as_of_date",
                format!("{as_of} is {months} months out, beyond the {MAX_PROJECTION_MONTHS} month horizon"),
            ));
        }
        Ok(months)
    }

    /// Project both schemes; returns (scheme 58, scheme 60)
    pub fn project(&self, as_of: YearMonth) -> Result<(ProjectionSeries, ProjectionSeries)> {
        self.horizon_months(as_of)?;
        let (scheme58, scheme60) = rayon::join(
            || self.project_scheme(SchemeId::Age58, as_of),
            || self.project_scheme(SchemeId::Age60, as_of),
        );
        Ok((scheme58?, scheme60?))
    }

    /// Project a single scheme from the lump-sum month to `as_of` inclusive
    pub fn project_scheme(&self, id: SchemeId, as_of: YearMonth) -> Result<ProjectionSeries> {
        let months = self.horizon_months(as_of)?;
        let scheme = self.params.scheme(id);
        let rates = MonthlyRates::for_scheme(scheme);

        log::debug!(
            "Projecting {} from {} to {} ({} months)",
            id,
            self.params.lump_sum_month(),
            as_of,
            months
        );

        let mut state = ProjectionState::opening(self.params.lump_sum_month(), self.params.lump_sum);
        let mut records = Vec::with_capacity(months + 1);
        records.push(state.to_record(&MonthFlows::default()));

        for _ in 0..months {
            records.push(self.step(id, scheme, &rates, &mut state));
        }

        log::debug!("{} final balance {:.2}", id, state.balance());
        Ok(ProjectionSeries::new(id, records))
    }

    /// Advance one month: growth on prior balances, contribution, payout, tax,
    /// then reinvestment of the net pension
    fn step(
        &self,
        id: SchemeId,
        scheme: &SchemeParams,
        rates: &MonthlyRates,
        state: &mut ProjectionState,
    ) -> MonthlyRecord {
        let params = &self.params;
        let date = state.date.succ();
        let tax_rate = params.tax_rate_for(date);
        let tax_free = params.tax_free_month();

        let mut flows = MonthFlows::default();

        // No growth on an overdrawn account
        if state.main_balance > 0.0 {
            flows.main_growth = state.main_balance * rates.main;
            if params.tax_on_growth && flows.main_growth > 0.0 {
                flows.growth_tax = flows.main_growth * tax_rate;
            }
        }
        if let Some(sip_rate) = rates.sip {
            flows.sip_growth = state.sip_balance * sip_rate;
        }

        if date <= scheme.contribution_end_month() {
            flows.to_main = params.monthly_contribution;
        } else if rates.sip.is_some() && date < tax_free {
            flows.to_sip = params.monthly_contribution;
        }

        if date >= scheme.pension_start_month() {
            flows.gross_payout = scheme.pension_amount;
            flows.pension_tax = flows.gross_payout * tax_rate;
        }

        state.advance(&flows);

        if date >= tax_free && state.sip_balance != 0.0 {
            let moved = state.merge_sip();
            log::info!("{}: SIP fund of {:.2} merged into main account in {}", id, moved, date);
        }

        // Net pension goes into the reinvestment pot; its interest is taxed like the pension
        let (interest, reinvestment_tax) = state.reinvest(flows.net_payout(), rates.main, tax_rate);
        flows.reinvestment_interest = interest;
        flows.reinvestment_tax = reinvestment_tax;

        if state.balance() < 0.0 && !state.overdrawn {
            state.overdrawn = true;
            log::warn!("{}: balance turned negative ({:.2}) in {}", id, state.balance(), date);
        }

        state.to_record(&flows)
    }
}

/// Project both schemes for `params` up to `as_of` (scheme 58, scheme 60)
pub fn project(
    params: &ParameterSet,
    as_of: impl Into<YearMonth>,
) -> Result<(ProjectionSeries, ProjectionSeries)> {
    ProjectionEngine::new(params.clone())?.project(as_of.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{AnnualRate, Compounding};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    /// Flat setup: 100k lump sum in Jan 2025, no growth, no tax
    fn flat_params() -> ParameterSet {
        let scheme = SchemeParams {
            pension_amount: 0.0,
            pension_start_date: date(2040, 1, 1),
            contribution_end_date: date(2025, 6, 30),
            reinvestment_rate: AnnualRate::effective(0.0),
            sip_growth_rate: None,
        };
        ParameterSet {
            lump_sum: 100_000.0,
            lump_sum_date: date(2025, 1, 1),
            monthly_contribution: 1_000.0,
            scheme58: scheme.clone(),
            scheme60: scheme,
            tax_enabled: false,
            tax_rate: 0.0,
            tax_free_from: None,
            tax_on_growth: false,
        }
    }

    #[test]
    fn test_as_of_lump_sum_month_gives_single_record() {
        let params = ParameterSet::default();
        let (s58, s60) = project(&params, params.lump_sum_date).unwrap();
        for series in [&s58, &s60] {
            assert_eq!(series.len(), 1);
            assert_eq!(series.records()[0].balance, params.lump_sum);
        }
    }

    #[test]
    fn test_contributions_stop_after_end_month() {
        let params = flat_params();
        let (s58, _) = project(&params, month(2025, 12)).unwrap();

        // Feb..=Jun receive contributions, the lump-sum month does not
        let contributing: Vec<_> = s58.iter().filter(|r| r.contribution > 0.0).map(|r| r.date).collect();
        assert_eq!(contributing.first(), Some(&month(2025, 2)));
        assert_eq!(contributing.last(), Some(&month(2025, 6)));
        assert_eq!(contributing.len(), 5);
        assert_eq!(s58.final_balance(), 105_000.0);
        assert_eq!(s58.totals().total_contributions, 105_000.0);
    }

    #[test]
    fn test_contribution_end_equal_to_lump_sum_month() {
        let mut params = flat_params();
        params.scheme58.contribution_end_date = params.lump_sum_date;
        let (s58, _) = project(&params, month(2026, 1)).unwrap();
        assert!(s58.iter().all(|r| r.contribution == 0.0));
        assert_eq!(s58.final_balance(), 100_000.0);
    }

    #[test]
    fn test_growth_uses_effective_monthly_rate() {
        let mut params = flat_params();
        params.monthly_contribution = 0.0;
        params.scheme60.reinvestment_rate = AnnualRate::effective(0.12);
        let (_, s60) = project(&params, month(2026, 1)).unwrap();

        // Twelve months at the effective annual rate
        assert_relative_eq!(s60.final_balance(), 112_000.0, epsilon = 1e-6);
        let monthly = 1.12_f64.powf(1.0 / 12.0) - 1.0;
        assert_relative_eq!(s60.records()[1].growth, 100_000.0 * monthly, epsilon = 1e-9);
    }

    #[test]
    fn test_pension_tax_before_sixty() {
        let mut params = flat_params();
        params.monthly_contribution = 0.0;
        params.tax_enabled = true;
        params.tax_rate = 0.10;
        params.tax_free_from = Some(date(2025, 6, 1));
        params.scheme58.pension_amount = 10_000.0;
        params.scheme58.pension_start_date = date(2025, 3, 1);

        let (s58, s60) = project(&params, month(2025, 8)).unwrap();

        let march = s58.at(month(2025, 3)).unwrap();
        assert_eq!(march.tax_deducted, 1_000.0);
        assert_eq!(march.payout, 9_000.0);
        assert_eq!(s58.at(month(2025, 2)).unwrap().payout, 0.0);

        let june = s58.at(month(2025, 6)).unwrap();
        assert_eq!(june.tax_deducted, 0.0);
        assert_eq!(june.payout, 10_000.0);

        // 3 taxed months + 3 untaxed months of 10k gross
        assert_eq!(s58.final_balance(), 40_000.0);
        assert_eq!(s58.totals().total_tax, 3_000.0);
        assert!(s60.iter().all(|r| r.payout == 0.0));
    }

    #[test]
    fn test_reinvested_pensions_compound_and_interest_is_taxed() {
        let mut params = flat_params();
        params.monthly_contribution = 0.0;
        params.tax_enabled = true;
        params.tax_rate = 0.10;
        params.tax_free_from = Some(date(2025, 4, 1));
        params.scheme58.pension_amount = 10_000.0;
        params.scheme58.pension_start_date = date(2025, 2, 1);
        // 12% nominal compounded monthly is 1% a month
        params.scheme58.reinvestment_rate = AnnualRate::new(0.12, Compounding::Monthly);

        let (s58, s60) = project(&params, month(2025, 4)).unwrap();

        // Feb: 9000 in, 90 interest less 9 tax
        let feb = s58.at(month(2025, 2)).unwrap();
        assert_relative_eq!(feb.reinvested_value, 9_081.0, epsilon = 1e-6);
        assert_relative_eq!(feb.reinvestment_tax, 9.0, epsilon = 1e-6);
        // Mar: 9000 more, interest on 18081 less 10%
        let mar = s58.at(month(2025, 3)).unwrap();
        assert_relative_eq!(mar.reinvested_value, 18_243.729, epsilon = 1e-6);
        assert_relative_eq!(mar.reinvestment_interest, 180.81, epsilon = 1e-6);
        assert_relative_eq!(mar.reinvestment_tax, 18.081, epsilon = 1e-6);
        // Apr: tax free, the full 10000 goes in and interest is untaxed
        let apr = s58.at(month(2025, 4)).unwrap();
        assert_relative_eq!(apr.reinvested_value, 28_526.16629, epsilon = 1e-6);
        assert_eq!(apr.reinvestment_tax, 0.0);

        let totals = s58.totals();
        assert_relative_eq!(totals.final_reinvested_value, 28_526.16629, epsilon = 1e-6);
        assert_relative_eq!(totals.total_reinvestment_interest, 526.16629, epsilon = 1e-6);
        assert_relative_eq!(totals.total_reinvestment_tax, 27.081, epsilon = 1e-6);
        assert_eq!(totals.total_pension_tax, 2_000.0);
        assert_relative_eq!(totals.all_tax(), 2_027.081, epsilon = 1e-6);

        // The pot sits beside the account: the balance identity is unchanged
        for pair in s58.records().windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            let expected = prev.balance + cur.contribution + cur.growth - cur.payout - cur.tax_deducted;
            assert_relative_eq!(cur.balance, expected, epsilon = 1e-6);
        }

        assert_eq!(s60.totals().final_reinvested_value, 0.0);
    }

    #[test]
    fn test_reinvestment_interest_untaxed_when_tax_disabled() {
        let mut params = flat_params();
        params.tax_rate = 0.10;
        params.scheme60.pension_amount = 10_000.0;
        params.scheme60.pension_start_date = date(2025, 2, 1);
        params.scheme60.reinvestment_rate = AnnualRate::new(0.12, Compounding::Monthly);
        let (_, s60) = project(&params, month(2025, 3)).unwrap();

        let mar = s60.at(month(2025, 3)).unwrap();
        assert!(s60.iter().all(|r| r.reinvestment_tax == 0.0));
        assert_relative_eq!(mar.reinvested_value, 20_100.0 * 1.01, epsilon = 1e-6);
        assert_relative_eq!(mar.cumulative_reinvestment_interest, 100.0 + 201.0, epsilon = 1e-6);
    }

    #[test]
    fn test_tax_disabled_deducts_nothing() {
        let mut params = flat_params();
        params.tax_enabled = false;
        params.tax_rate = 0.10;
        params.scheme58.pension_amount = 10_000.0;
        params.scheme58.pension_start_date = date(2025, 2, 1);
        let (s58, _) = project(&params, month(2025, 4)).unwrap();
        assert!(s58.iter().all(|r| r.tax_deducted == 0.0));
        assert_eq!(s58.records()[1].payout, 10_000.0);
    }

    #[test]
    fn test_growth_tax_only_when_enabled() {
        let mut params = flat_params();
        params.monthly_contribution = 0.0;
        params.tax_enabled = true;
        params.tax_rate = 0.5;
        params.tax_free_from = Some(date(2030, 1, 1));
        params.scheme58.reinvestment_rate = AnnualRate::effective(0.12);

        let (untaxed, _) = project(&params, month(2025, 2)).unwrap();
        assert_eq!(untaxed.records()[1].growth_tax, 0.0);

        params.tax_on_growth = true;
        let (taxed, _) = project(&params, month(2025, 2)).unwrap();
        let feb = taxed.records()[1];
        assert_relative_eq!(feb.growth_tax, feb.growth * 0.5, epsilon = 1e-9);
        assert_relative_eq!(feb.balance, 100_000.0 + feb.growth * 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_sip_fund_collects_then_merges() {
        let mut params = flat_params();
        params.scheme58.contribution_end_date = date(2025, 3, 31);
        params.scheme58.sip_growth_rate = Some(AnnualRate::effective(0.0));
        params.tax_free_from = Some(date(2025, 7, 1));

        let (s58, s60) = project(&params, month(2025, 9)).unwrap();

        // Feb, Mar to provider; Apr, May, Jun into the SIP fund
        assert_eq!(s58.at(month(2025, 3)).unwrap().sip_balance, 0.0);
        assert_eq!(s58.at(month(2025, 6)).unwrap().sip_balance, 3_000.0);
        assert_eq!(s58.at(month(2025, 6)).unwrap().main_balance(), 102_000.0);

        // Merged in the tax-free month, no further contributions
        let july = s58.at(month(2025, 7)).unwrap();
        assert_eq!(july.sip_balance, 0.0);
        assert_eq!(july.contribution, 0.0);
        assert_eq!(july.balance, 105_000.0);
        assert_eq!(s58.final_balance(), 105_000.0);

        // Scheme 60 has no SIP fund: contributions simply end in June
        assert_eq!(s60.final_balance(), 105_000.0);
        assert!(s60.iter().all(|r| r.sip_balance == 0.0));
    }

    #[test]
    fn test_sip_growth_rate_applies_to_fund() {
        let mut params = flat_params();
        params.scheme58.contribution_end_date = date(2025, 1, 31);
        params.scheme58.sip_growth_rate = Some(AnnualRate::effective(0.12));
        params.tax_free_from = Some(date(2026, 1, 1));
        let (s58, _) = project(&params, month(2025, 3)).unwrap();

        let monthly = 1.12_f64.powf(1.0 / 12.0) - 1.0;
        let march = s58.at(month(2025, 3)).unwrap();
        // Feb: 1000 in; Mar: growth on 1000, another 1000 in
        assert_relative_eq!(march.sip_balance, 2_000.0 + 1_000.0 * monthly, epsilon = 1e-9);
    }

    #[test]
    fn test_as_of_before_lump_sum_fails() {
        let params = flat_params();
        assert!(matches!(
            project(&params, month(2024, 12)),
            Err(ProjectionError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_horizon_limit() {
        let params = flat_params();
        let start = params.lump_sum_month();
        assert!(project(&params, start.add_months(MAX_PROJECTION_MONTHS as i64)).is_ok());
        assert!(project(&params, start.add_months(MAX_PROJECTION_MONTHS as i64 + 1)).is_err());
    }

    #[test]
    fn test_invalid_params_rejected_before_projection() {
        let mut params = flat_params();
        params.scheme58.reinvestment_rate = AnnualRate::effective(-2.0);
        assert!(ProjectionEngine::new(params).is_err());
    }

    #[test]
    fn test_overdrawn_account_stops_growing() {
        let mut params = flat_params();
        params.monthly_contribution = 0.0;
        params.lump_sum = 10_000.0;
        params.scheme60.reinvestment_rate = AnnualRate::effective(0.10);
        params.scheme60.pension_amount = 20_000.0;
        params.scheme60.pension_start_date = date(2025, 2, 1);
        let (_, s60) = project(&params, month(2025, 4)).unwrap();

        assert!(s60.records()[1].balance < 0.0);
        assert_eq!(s60.records()[2].growth, 0.0);
    }
}
