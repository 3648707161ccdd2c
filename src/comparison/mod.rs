//! Scheme comparison: crossover detection, lead changes and final ranking

use serde::Serialize;

use crate::calendar::YearMonth;
use crate::error::{ProjectionError, Result};
use crate::params::SchemeId;
use crate::projection::{ProjectionSeries, SeriesTotals};

/// Final balances closer than this are treated as equal
pub const CURRENCY_EPSILON: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BetterScheme {
    Scheme58,
    Scheme60,
    Tie,
}

/// A month in which the strictly-ahead scheme changed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OvertakeEvent {
    pub month_index: usize,
    pub date: YearMonth,
    /// Scheme that is ahead from this month
    pub leader: SchemeId,
    /// Leader's balance minus the other scheme's balance
    pub margin: f64,
}

impl OvertakeEvent {
    pub fn describe(&self) -> String {
        let other = match self.leader {
            SchemeId::Age58 => SchemeId::Age60,
            SchemeId::Age60 => SchemeId::Age58,
        };
        format!("{} overtakes {} in {}", self.leader, other, self.date.long_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    /// First month in which the initially leading scheme falls behind
    pub crossover_month: Option<YearMonth>,
    pub scheme58_final_value: f64,
    pub scheme60_final_value: f64,
    pub better_scheme: BetterScheme,
    /// Reinvestment pot of each scheme at the as-of month
    pub scheme58_reinvested_value: f64,
    pub scheme60_reinvested_value: f64,
    pub scheme58: SeriesTotals,
    pub scheme60: SeriesTotals,
    /// Every lead change, in order; the first one is the crossover
    pub overtakes: Vec<OvertakeEvent>,
}

impl ComparisonSummary {
    pub fn crossover(&self) -> Option<&OvertakeEvent> {
        self.overtakes.first()
    }

    /// Schemes ordered by final value, highest first
    pub fn ranking(&self) -> Vec<(SchemeId, f64)> {
        let mut ranked = vec![
            (SchemeId::Age58, self.scheme58_final_value),
            (SchemeId::Age60, self.scheme60_final_value),
        ];
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Tax per scheme split into (pension and growth tax, reinvestment interest tax)
    pub fn tax_split(&self) -> [(SchemeId, f64, f64); 2] {
        [
            (SchemeId::Age58, self.scheme58.total_tax, self.scheme58.total_reinvestment_tax),
            (SchemeId::Age60, self.scheme60.total_tax, self.scheme60.total_reinvestment_tax),
        ]
    }
}

/// Strict leader for one month; `None` on an exact tie
fn leader(balance58: f64, balance60: f64) -> Option<SchemeId> {
    if balance58 > balance60 {
        Some(SchemeId::Age58)
    } else if balance60 > balance58 {
        Some(SchemeId::Age60)
    } else {
        None
    }
}

fn check_scheme(field: &str, series: &ProjectionSeries, expected: SchemeId) -> Result<()> {
    if series.scheme() != expected {
        return Err(ProjectionError::invalid(
            field,
            format!("expected a {expected} series, got {}", series.scheme()),
        ));
    }
    Ok(())
}

/// Compare two series month by month
///
/// Both series must belong to their named scheme and share a start month.
/// Ties are skipped: the reference leader is the first scheme strictly
/// ahead, and an overtake is recorded whenever the other scheme becomes
/// strictly ahead.
pub fn compare(scheme58: &ProjectionSeries, scheme60: &ProjectionSeries) -> Result<ComparisonSummary> {
    check_scheme("scheme58", scheme58, SchemeId::Age58)?;
    check_scheme("scheme60", scheme60, SchemeId::Age60)?;
    if scheme58.len() != scheme60.len() {
        return Err(ProjectionError::MismatchedSeries {
            scheme58_len: scheme58.len(),
            scheme60_len: scheme60.len(),
        });
    }
    if scheme58.start() != scheme60.start() {
        return Err(ProjectionError::invalid(
            "series",
            format!(
                "Scheme 58 starts in {}, Scheme 60 in {}",
                scheme58.start().map(|m| m.to_string()).unwrap_or_default(),
                scheme60.start().map(|m| m.to_string()).unwrap_or_default(),
            ),
        ));
    }

    let mut overtakes = Vec::new();
    let mut current: Option<SchemeId> = None;

    for (r58, r60) in scheme58.iter().zip(scheme60.iter()) {
        let Some(ahead) = leader(r58.balance, r60.balance) else {
            continue;
        };
        match current {
            None => current = Some(ahead),
            Some(prev) if prev != ahead => {
                let margin = match ahead {
                    SchemeId::Age58 => r58.balance - r60.balance,
                    SchemeId::Age60 => r60.balance - r58.balance,
                };
                let event = OvertakeEvent {
                    month_index: r58.month_index,
                    date: r58.date,
                    leader: ahead,
                    margin,
                };
                log::debug!("{}", event.describe());
                overtakes.push(event);
                current = Some(ahead);
            }
            Some(_) => {}
        }
    }

    let final58 = scheme58.final_balance();
    let final60 = scheme60.final_balance();
    let better_scheme = if (final58 - final60).abs() <= CURRENCY_EPSILON {
        BetterScheme::Tie
    } else if final58 > final60 {
        BetterScheme::Scheme58
    } else {
        BetterScheme::Scheme60
    };

    let totals58 = scheme58.totals();
    let totals60 = scheme60.totals();

    Ok(ComparisonSummary {
        crossover_month: overtakes.first().map(|e| e.date),
        scheme58_final_value: final58,
        scheme60_final_value: final60,
        better_scheme,
        scheme58_reinvested_value: totals58.final_reinvested_value,
        scheme60_reinvested_value: totals60.final_reinvested_value,
        scheme58: totals58,
        scheme60: totals60,
        overtakes,
    })
}
