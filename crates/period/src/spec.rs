//! Period intents.
//!
//! Responsibilities:
//! - Name every way a period can be requested: the current week, one of the
//!   seven "now"-relative intents, or an explicit start/end range.
//! - Parse intents from the spellings used by profiles and the CLI.
//!
//! Invariants:
//! - A `Range` always has `start <= end` (checked by [`PeriodSpec::range`]).
//! - Week counts inside `AutoPeriod` built by [`AutoPeriod::from_parts`] are >= 1.

use std::fmt;

use crate::error::PeriodError;
use crate::year_week::YearWeek;

/// A period computed relative to the current date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoPeriod {
    /// `n` consecutive weeks ending with the current week.
    LastWeeks(u32),
    /// Same window as `LastWeeks`, kept as its own intent for profiles that name it.
    RollingWeeks(u32),
    CurrentMonth,
    LastMonth,
    CurrentQuarter,
    LastQuarter,
    YearToDate,
}

impl AutoPeriod {
    /// Builds an intent from its name and optional week count.
    ///
    /// Names are case-insensitive and accept both `last-weeks` and `last_weeks`.
    /// The count is required for `last-weeks`/`rolling-weeks` and ignored otherwise.
    pub fn from_parts(kind: &str, value: Option<i64>) -> Result<Self, PeriodError> {
        let normalized = kind.trim().to_ascii_lowercase().replace('_', "-");
        let count = || -> Result<u32, PeriodError> {
            let n = value.ok_or_else(|| PeriodError::MissingCount {
                intent: normalized.clone(),
            })?;
            if n < 1 {
                return Err(PeriodError::NonPositiveCount { count: n });
            }
            u32::try_from(n).map_err(|_| PeriodError::CountTooLarge { count: n })
        };

        match normalized.as_str() {
            "last-weeks" => Ok(Self::LastWeeks(count()?)),
            "rolling-weeks" => Ok(Self::RollingWeeks(count()?)),
            "current-month" => Ok(Self::CurrentMonth),
            "last-month" => Ok(Self::LastMonth),
            "current-quarter" => Ok(Self::CurrentQuarter),
            "last-quarter" => Ok(Self::LastQuarter),
            "year-to-date" => Ok(Self::YearToDate),
            _ => Err(PeriodError::UnknownIntent(kind.to_string())),
        }
    }

    /// Canonical kebab-case name of the intent.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LastWeeks(_) => "last-weeks",
            Self::RollingWeeks(_) => "rolling-weeks",
            Self::CurrentMonth => "current-month",
            Self::LastMonth => "last-month",
            Self::CurrentQuarter => "current-quarter",
            Self::LastQuarter => "last-quarter",
            Self::YearToDate => "year-to-date",
        }
    }
}

impl fmt::Display for AutoPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastWeeks(n) | Self::RollingWeeks(n) => write!(f, "{} ({n})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// How the export period was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSpec {
    /// Nothing was requested; export the current week only.
    CurrentWeek,
    Auto(AutoPeriod),
    Range { start: YearWeek, end: YearWeek },
}

impl PeriodSpec {
    /// A manual range; fails when `start` is chronologically after `end`.
    pub fn range(start: YearWeek, end: YearWeek) -> Result<Self, PeriodError> {
        if start > end {
            return Err(PeriodError::InvertedRange { start, end });
        }
        Ok(Self::Range { start, end })
    }

    /// Parses a `YYYY-WW:YYYY-WW` range.
    pub fn parse_range(input: &str) -> Result<Self, PeriodError> {
        let (start, end) = input
            .split_once(':')
            .ok_or_else(|| PeriodError::InvalidRange {
                input: input.to_string(),
            })?;
        if end.contains(':') {
            return Err(PeriodError::InvalidRange {
                input: input.to_string(),
            });
        }
        Self::from_bounds(start, end)
    }

    /// Parses discrete start and end tokens.
    pub fn from_bounds(start: &str, end: &str) -> Result<Self, PeriodError> {
        Self::range(start.parse()?, end.parse()?)
    }
}

impl fmt::Display for PeriodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrentWeek => f.write_str("current-week"),
            Self::Auto(auto) => write!(f, "{auto}"),
            Self::Range { start, end } => write!(f, "{start}:{end}"),
        }
    }
}
