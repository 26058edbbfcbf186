//! Calendar arithmetic for period intents.
//!
//! Responsibilities:
//! - Expand every [`PeriodSpec`] into an ascending, duplicate-free week list.
//! - Assign weeks to months and quarters by the ISO Thursday rule.
//! - Filter a requested week list down to the weeks a data source reports.
//!
//! Does NOT handle:
//! - Deciding which intent applies (the config resolver does that).
//! - Reading the system clock (a [`Clock`] is injected).
//!
//! Invariants:
//! - A week belongs to a month (and so to a quarter) iff its Thursday falls in
//!   that month. Every week therefore belongs to exactly one month.
//! - All returned sequences are strictly ascending.

use std::collections::HashSet;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::clock::{Clock, SystemClock};
use crate::error::PeriodError;
use crate::spec::{AutoPeriod, PeriodSpec};
use crate::year_week::{MAX_YEAR, MIN_YEAR, YearWeek};

/// Quarter (1-4) that a calendar month (1-12) belongs to.
pub fn quarter_of(month: u32) -> u32 {
    (month.saturating_sub(1)) / 3 + 1
}

/// All ISO weeks whose Thursday falls in the given calendar month.
pub fn weeks_in_month(year: i32, month: u32) -> Result<Vec<YearWeek>, PeriodError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(PeriodError::YearOutOfRange { year });
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(PeriodError::InvalidMonth { year, month })?;

    let offset = (7 + Weekday::Thu.num_days_from_monday() - first.weekday().num_days_from_monday())
        % 7;
    let mut thursday = first
        .checked_add_days(Days::new(u64::from(offset)))
        .ok_or(PeriodError::YearOutOfRange { year })?;

    let mut weeks = Vec::with_capacity(5);
    while thursday.month() == month {
        weeks.push(YearWeek::from_date(thursday)?);
        match thursday.checked_add_days(Days::new(7)) {
            Some(next) => thursday = next,
            None => break,
        }
    }
    Ok(weeks)
}

/// All ISO weeks whose Thursday falls in the given quarter.
pub fn weeks_in_quarter(year: i32, quarter: u32) -> Result<Vec<YearWeek>, PeriodError> {
    if !(1..=4).contains(&quarter) {
        return Err(PeriodError::InvalidQuarter { quarter });
    }
    let first_month = (quarter - 1) * 3 + 1;
    let mut weeks = Vec::with_capacity(14);
    for month in first_month..first_month + 3 {
        weeks.extend(weeks_in_month(year, month)?);
    }
    Ok(weeks)
}

/// Every week from `start` through `end`, inclusive.
pub fn weeks_between(start: YearWeek, end: YearWeek) -> Result<Vec<YearWeek>, PeriodError> {
    if start > end {
        return Err(PeriodError::InvertedRange { start, end });
    }
    let mut weeks = vec![start];
    let mut current = start;
    while current < end {
        match current.next() {
            Some(next) => {
                weeks.push(next);
                current = next;
            }
            None => break,
        }
    }
    Ok(weeks)
}

/// Keeps the weeks of `requested` that also appear in `available`.
///
/// The order of `requested` is preserved. An empty result is a valid outcome
/// meaning there is nothing to export.
pub fn intersect_with_available<I>(requested: &[YearWeek], available: I) -> Vec<YearWeek>
where
    I: IntoIterator<Item = YearWeek>,
{
    let available: HashSet<YearWeek> = available.into_iter().collect();
    let kept: Vec<YearWeek> = requested
        .iter()
        .copied()
        .filter(|week| available.contains(week))
        .collect();

    if kept.len() < requested.len() {
        tracing::warn!(
            excluded = requested.len() - kept.len(),
            remaining = kept.len(),
            "Requested weeks missing from the cube were excluded"
        );
    }
    kept
}

/// Expands period intents relative to the date reported by a [`Clock`].
#[derive(Debug, Clone, Default)]
pub struct PeriodCalculator<C = SystemClock> {
    clock: C,
}

impl PeriodCalculator<SystemClock> {
    /// A calculator driven by the local system clock.
    pub fn system() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> PeriodCalculator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// The ISO week containing today.
    pub fn current_week(&self) -> Result<YearWeek, PeriodError> {
        YearWeek::from_date(self.today())
    }

    /// `n` consecutive weeks ending at, and including, the current week.
    pub fn last_weeks(&self, n: u32) -> Result<Vec<YearWeek>, PeriodError> {
        if n == 0 {
            return Err(PeriodError::NonPositiveCount { count: 0 });
        }
        let too_large = PeriodError::CountTooLarge {
            count: i64::from(n),
        };
        let mut current = self.current_week()?;
        // No ISO year has more than 53 weeks.
        let reachable = i64::from(current.year() - MIN_YEAR + 1) * 53;
        if i64::from(n) > reachable {
            return Err(too_large);
        }
        let mut weeks = Vec::with_capacity(n as usize);
        weeks.push(current);
        for _ in 1..n {
            current = current.prev().ok_or_else(|| too_large.clone())?;
            weeks.push(current);
        }
        weeks.reverse();
        Ok(weeks)
    }

    /// A rolling window of `n` weeks ending with the current week.
    ///
    /// Computes exactly what [`last_weeks`](Self::last_weeks) computes.
    pub fn rolling_weeks(&self, n: u32) -> Result<Vec<YearWeek>, PeriodError> {
        self.last_weeks(n)
    }

    pub fn current_month(&self) -> Result<Vec<YearWeek>, PeriodError> {
        let today = self.today();
        weeks_in_month(today.year(), today.month())
    }

    pub fn last_month(&self) -> Result<Vec<YearWeek>, PeriodError> {
        let today = self.today();
        let (year, month) = match today.month() {
            1 => (today.year() - 1, 12),
            m => (today.year(), m - 1),
        };
        weeks_in_month(year, month)
    }

    pub fn current_quarter(&self) -> Result<Vec<YearWeek>, PeriodError> {
        let today = self.today();
        weeks_in_quarter(today.year(), quarter_of(today.month()))
    }

    pub fn last_quarter(&self) -> Result<Vec<YearWeek>, PeriodError> {
        let today = self.today();
        let (year, quarter) = match quarter_of(today.month()) {
            1 => (today.year() - 1, 4),
            q => (today.year(), q - 1),
        };
        weeks_in_quarter(year, quarter)
    }

    /// Week 1 of the current ISO year through the current week.
    pub fn year_to_date(&self) -> Result<Vec<YearWeek>, PeriodError> {
        let current = self.current_week()?;
        weeks_between(YearWeek::new(current.year(), 1)?, current)
    }

    /// The ascending week sequence for any period intent.
    pub fn generate_year_week_pairs(&self, spec: &PeriodSpec) -> Result<Vec<YearWeek>, PeriodError> {
        let weeks = match spec {
            PeriodSpec::CurrentWeek => vec![self.current_week()?],
            PeriodSpec::Range { start, end } => weeks_between(*start, *end)?,
            PeriodSpec::Auto(auto) => match auto {
                AutoPeriod::LastWeeks(n) => self.last_weeks(*n)?,
                AutoPeriod::RollingWeeks(n) => self.rolling_weeks(*n)?,
                AutoPeriod::CurrentMonth => self.current_month()?,
                AutoPeriod::LastMonth => self.last_month()?,
                AutoPeriod::CurrentQuarter => self.current_quarter()?,
                AutoPeriod::LastQuarter => self.last_quarter()?,
                AutoPeriod::YearToDate => self.year_to_date()?,
            },
        };
        tracing::debug!(period = %spec, weeks = weeks.len(), "Calculated export period");
        Ok(weeks)
    }
}
