//! ISO-week period calculations for OLAP exports.
//!
//! This crate turns period intents ("last quarter", "2025-50:2026-02") into
//! ordered sequences of ISO year-week identifiers, and filters those sequences
//! against the weeks a data source actually has.

mod calculator;
mod clock;
mod error;
mod spec;
mod year_week;

pub use calculator::{
    PeriodCalculator, intersect_with_available, quarter_of, weeks_between, weeks_in_month,
    weeks_in_quarter,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::PeriodError;
pub use spec::{AutoPeriod, PeriodSpec};
pub use year_week::{MAX_YEAR, MIN_YEAR, YearWeek, weeks_in_year};
