//! Command-line override input.
//!
//! Only flags the user actually passed are recorded, so a CLI default can never
//! win over a profile, environment, or settings-file value.

use std::collections::BTreeMap;

use olap_period::PeriodSpec;

/// Parsed command-line overrides keyed by dotted field path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    values: BTreeMap<String, String>,
    period: Option<PeriodSpec>,
    schedule: Option<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a flag the user passed.
    pub fn set(&mut self, path: &str, value: impl Into<String>) {
        self.values.insert(path.to_string(), value.into());
    }

    /// Chaining form of [`set`](Self::set).
    pub fn with(mut self, path: &str, value: impl Into<String>) -> Self {
        self.set(path, value);
        self
    }

    /// Sets the period intent; it takes precedence over every other period source.
    pub fn with_period(mut self, period: PeriodSpec) -> Self {
        self.period = Some(period);
        self
    }

    /// Sets a simple schedule such as `every monday at 09:00`.
    pub fn with_schedule(mut self, every: impl Into<String>) -> Self {
        self.schedule = Some(every.into());
        self
    }

    /// The value for `path` if the flag was passed.
    pub fn explicit(&self, path: &str) -> Option<&str> {
        self.values.get(path).map(String::as_str)
    }

    /// Every passed path.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn period(&self) -> Option<&PeriodSpec> {
        self.period.as_ref()
    }

    pub fn schedule(&self) -> Option<&str> {
        self.schedule.as_deref()
    }
}
