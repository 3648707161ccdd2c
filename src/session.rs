//! Session state for an interactive front end
//!
//! Holds the current parameter set and the displayed as-of month. A front
//! end calls these methods from its event handlers and renders whatever
//! `evaluate` returns; nothing here is global.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::YearMonth;
use crate::comparison::{compare, ComparisonSummary};
use crate::error::Result;
use crate::params::ParameterSet;
use crate::projection::{ProjectionEngine, ProjectionSeries, MAX_PROJECTION_MONTHS};

/// Initial cursor position, relative to today
const INITIAL_CURSOR_MONTHS: i64 = 5 * 12;
/// Where the cursor lands when it falls before the first displayable month
const RESET_OFFSET_MONTHS: i64 = 2 * 12;
/// Furthest displayable month, relative to today
const MAX_DISPLAY_MONTHS: i64 = 30 * 12;

/// Date navigation steps offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    BackYear,
    BackQuarter,
    ForwardQuarter,
    ForwardYear,
}

impl Navigation {
    pub fn months(&self) -> i64 {
        match self {
            Navigation::BackYear => -12,
            Navigation::BackQuarter => -3,
            Navigation::ForwardQuarter => 3,
            Navigation::ForwardYear => 12,
        }
    }
}

/// Everything a front end needs to render one as-of month
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub as_of: YearMonth,
    pub scheme58: ProjectionSeries,
    pub scheme60: ProjectionSeries,
    pub summary: ComparisonSummary,
}

#[derive(Debug, Clone)]
pub struct Session {
    engine: ProjectionEngine,
    today: YearMonth,
    cursor: YearMonth,
}

impl Session {
    /// Start a session; `today` anchors the default cursor and display range
    pub fn new(params: ParameterSet, today: NaiveDate) -> Result<Self> {
        let today = YearMonth::from_date(today);
        let mut session = Self {
            engine: ProjectionEngine::new(params)?,
            today,
            cursor: today.add_months(INITIAL_CURSOR_MONTHS),
        };
        session.settle_cursor();
        Ok(session)
    }

    pub fn params(&self) -> &ParameterSet {
        self.engine.params()
    }

    pub fn cursor(&self) -> YearMonth {
        self.cursor
    }

    /// First displayable month: the month after the latest of the lump sum
    /// and both pension starts
    pub fn min_display_month(&self) -> YearMonth {
        let params = self.params();
        params
            .lump_sum_month()
            .max(params.scheme58.pension_start_month())
            .max(params.scheme60.pension_start_month())
            .succ()
    }

    /// Last displayable month, never before the first one
    pub fn max_display_month(&self) -> YearMonth {
        let horizon = self.params().lump_sum_month().add_months(MAX_PROJECTION_MONTHS as i64);
        self.today
            .add_months(MAX_DISPLAY_MONTHS)
            .min(horizon)
            .max(self.min_display_month())
    }

    /// Move the cursor by one navigation step, staying within the display range
    pub fn navigate(&mut self, step: Navigation) -> YearMonth {
        self.jump_to(self.cursor.add_months(step.months()))
    }

    /// Place the cursor on `month`, clamped to the display range
    pub fn jump_to(&mut self, month: YearMonth) -> YearMonth {
        self.cursor = month.clamp(self.min_display_month(), self.max_display_month());
        self.cursor
    }

    /// Replace the parameter set; the old one is kept if the new one is invalid
    pub fn set_params(&mut self, params: ParameterSet) -> Result<()> {
        self.engine = ProjectionEngine::new(params)?;
        self.settle_cursor();
        Ok(())
    }

    /// Project both schemes to the cursor and compare them
    pub fn evaluate(&self) -> Result<Dashboard> {
        let (scheme58, scheme60) = self.engine.project(self.cursor)?;
        let summary = compare(&scheme58, &scheme60)?;
        Ok(Dashboard {
            as_of: self.cursor,
            scheme58,
            scheme60,
            summary,
        })
    }

    fn settle_cursor(&mut self) {
        let min = self.min_display_month();
        if self.cursor < min {
            log::debug!("Cursor {} before first displayable month {}, resetting", self.cursor, min);
            self.cursor = min.add_months(RESET_OFFSET_MONTHS);
        }
        self.cursor = self.cursor.clamp(min, self.max_display_month());
    }
}
