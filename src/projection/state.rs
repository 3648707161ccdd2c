//! Running state carried from month to month within one scheme projection

use crate::calendar::YearMonth;

use super::records::MonthlyRecord;

/// Flows for a single month, before they are folded into the state
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthFlows {
    pub to_main: f64,
    pub to_sip: f64,
    pub main_growth: f64,
    pub sip_growth: f64,
    pub gross_payout: f64,
    pub pension_tax: f64,
    pub growth_tax: f64,
    /// Gross interest credited to the reinvestment pot
    pub reinvestment_interest: f64,
    pub reinvestment_tax: f64,
}

impl MonthFlows {
    pub fn contribution(&self) -> f64 {
        self.to_main + self.to_sip
    }

    pub fn growth(&self) -> f64 {
        self.main_growth + self.sip_growth
    }

    pub fn tax(&self) -> f64 {
        self.pension_tax + self.growth_tax
    }

    pub fn net_payout(&self) -> f64 {
        self.gross_payout - self.pension_tax
    }
}

#[derive(Debug, Clone)]
pub struct ProjectionState {
    pub month_index: usize,
    pub date: YearMonth,
    /// Main account held with the provider
    pub main_balance: f64,
    /// Separate SIP fund, zero outside the SIP window
    pub sip_balance: f64,
    pub cumulative_contributions: f64,
    pub cumulative_payouts: f64,
    pub cumulative_tax: f64,
    /// Net pensions received and reinvested, with their compounded interest
    pub reinvested_value: f64,
    /// Interest credited to the reinvestment pot so far, net of tax
    pub cumulative_reinvestment_interest: f64,
    /// Set once the total balance has dropped below zero
    pub overdrawn: bool,
}

impl ProjectionState {
    /// State in the lump-sum month
    pub fn opening(date: YearMonth, lump_sum: f64) -> Self {
        Self {
            month_index: 0,
            date,
            main_balance: lump_sum,
            sip_balance: 0.0,
            cumulative_contributions: lump_sum,
            cumulative_payouts: 0.0,
            cumulative_tax: 0.0,
            reinvested_value: 0.0,
            cumulative_reinvestment_interest: 0.0,
            overdrawn: false,
        }
    }

    pub fn balance(&self) -> f64 {
        self.main_balance + self.sip_balance
    }

    /// Move to the next month and fold in its flows
    pub fn advance(&mut self, flows: &MonthFlows) {
        self.month_index += 1;
        self.date = self.date.succ();

        self.main_balance += flows.main_growth - flows.growth_tax + flows.to_main - flows.gross_payout;
        self.sip_balance += flows.sip_growth + flows.to_sip;

        self.cumulative_contributions += flows.contribution();
        self.cumulative_payouts += flows.net_payout();
        self.cumulative_tax += flows.tax();
    }

    /// Add this month's net pension to the reinvestment pot, then credit
    /// interest on the pot; returns (gross interest, tax on that interest)
    pub fn reinvest(&mut self, net_payout: f64, monthly_rate: f64, tax_rate: f64) -> (f64, f64) {
        self.reinvested_value += net_payout;
        if self.reinvested_value <= 0.0 {
            return (0.0, 0.0);
        }
        let interest = self.reinvested_value * monthly_rate;
        let tax = if interest > 0.0 { interest * tax_rate } else { 0.0 };
        self.reinvested_value += interest - tax;
        self.cumulative_reinvestment_interest += interest - tax;
        (interest, tax)
    }

    /// Transfer the SIP fund into the main account; returns the amount moved
    pub fn merge_sip(&mut self) -> f64 {
        let moved = self.sip_balance;
        self.main_balance += moved;
        self.sip_balance = 0.0;
        moved
    }

    pub fn to_record(&self, flows: &MonthFlows) -> MonthlyRecord {
        MonthlyRecord {
            month_index: self.month_index,
            date: self.date,
            contribution: flows.contribution(),
            growth: flows.growth(),
            payout: flows.net_payout(),
            tax_deducted: flows.tax(),
            pension_tax: flows.pension_tax,
            growth_tax: flows.growth_tax,
            balance: self.balance(),
            sip_balance: self.sip_balance,
            cumulative_contributions: self.cumulative_contributions,
            cumulative_payouts: self.cumulative_payouts,
            cumulative_tax: self.cumulative_tax,
            reinvested_value: self.reinvested_value,
            reinvestment_interest: flows.reinvestment_interest,
            reinvestment_tax: flows.reinvestment_tax,
            cumulative_reinvestment_interest: self.cumulative_reinvestment_interest,
        }
    }
}
