//! Error types for period parsing and calculation.
//!
//! Invariants:
//! - Every variant carries the offending input so messages are actionable
//!   without a debugger.

use thiserror::Error;

use crate::year_week::YearWeek;

/// Errors raised while parsing or computing a period.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("invalid year-week '{input}': expected YYYY-WW")]
    InvalidFormat { input: String },

    #[error("invalid period range '{input}': expected YYYY-WW:YYYY-WW")]
    InvalidRange { input: String },

    #[error("year {year} is outside the supported range")]
    YearOutOfRange { year: i32 },

    #[error("week {week} does not exist in ISO year {year} (valid: 1..={max})")]
    WeekOutOfRange { year: i32, week: u32, max: u32 },

    #[error("period start {start} is after period end {end}")]
    InvertedRange { start: YearWeek, end: YearWeek },

    #[error("week count must be at least 1, got {count}")]
    NonPositiveCount { count: i64 },

    #[error("unknown period intent '{0}'")]
    UnknownIntent(String),

    #[error("week count {count} is too large")]
    CountTooLarge { count: i64 },

    #[error("period intent '{intent}' requires a week count")]
    MissingCount { intent: String },

    #[error("invalid calendar month {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("invalid quarter {quarter}: must be 1-4")]
    InvalidQuarter { quarter: u32 },
}
