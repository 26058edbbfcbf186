//! The ISO year-week value type.
//!
//! Responsibilities:
//! - Represent an (ISO year, ISO week) pair that is valid by construction.
//! - Parse and render the `YYYY-WW` form used by profiles, env keys, and the CLI.
//! - Provide chronological ordering and stepping across year boundaries.
//!
//! Does NOT handle:
//! - Period intents or "now"-relative calculations (see `calculator.rs`).
//!
//! Invariants:
//! - `1 <= week <= weeks_in_year(year)` for every constructed value.
//! - Ordering is chronological: field order is (year, week), so "2025-52" sorts
//!   before "2026-01" regardless of how the strings compare.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PeriodError;

/// Smallest ISO year accepted by [`YearWeek::new`].
pub const MIN_YEAR: i32 = 1;

/// Largest ISO year accepted by [`YearWeek::new`].
pub const MAX_YEAR: i32 = 9999;

/// Number of ISO weeks (52 or 53) in the given ISO year.
///
/// A year has 53 weeks when it starts on a Thursday, or when it is a leap year
/// starting on a Wednesday. `p(y)` below is the weekday of December 31 of `y`.
pub fn weeks_in_year(year: i32) -> u32 {
    let p = |y: i32| (y + y.div_euclid(4) - y.div_euclid(100) + y.div_euclid(400)).rem_euclid(7);
    if p(year) == 4 || p(year - 1) == 3 {
        53
    } else {
        52
    }
}

/// An ISO 8601 (year, week) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearWeek {
    year: i32,
    week: u32,
}

impl YearWeek {
    /// Creates a validated year-week.
    pub fn new(year: i32, week: u32) -> Result<Self, PeriodError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(PeriodError::YearOutOfRange { year });
        }
        let max = weeks_in_year(year);
        if week == 0 || week > max {
            return Err(PeriodError::WeekOutOfRange { year, week, max });
        }
        Ok(Self { year, week })
    }

    /// The ISO week containing `date`.
    pub fn from_date(date: NaiveDate) -> Result<Self, PeriodError> {
        let iso = date.iso_week();
        Self::new(iso.year(), iso.week())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    /// Thursday of this week; it always falls inside the ISO year.
    pub fn thursday(&self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Thu)
    }

    /// The week after this one, rolling into week 1 of the next ISO year.
    pub fn next(&self) -> Option<Self> {
        if self.week < weeks_in_year(self.year) {
            Some(Self {
                year: self.year,
                week: self.week + 1,
            })
        } else if self.year < MAX_YEAR {
            Some(Self {
                year: self.year + 1,
                week: 1,
            })
        } else {
            None
        }
    }

    /// The week before this one, rolling back into the last week of the previous ISO year.
    pub fn prev(&self) -> Option<Self> {
        if self.week > 1 {
            Some(Self {
                year: self.year,
                week: self.week - 1,
            })
        } else if self.year > MIN_YEAR {
            let year = self.year - 1;
            Some(Self {
                year,
                week: weeks_in_year(year),
            })
        } else {
            None
        }
    }
}

impl fmt::Display for YearWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.week)
    }
}

impl FromStr for YearWeek {
    type Err = PeriodError;

    /// Parses `YYYY-WW`; an ISO-style `YYYY-Www` is accepted as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || PeriodError::InvalidFormat {
            input: s.to_string(),
        };

        let (year, week) = trimmed.split_once('-').ok_or_else(invalid)?;
        let week = week
            .strip_prefix('W')
            .or_else(|| week.strip_prefix('w'))
            .unwrap_or(week);

        let digits = |part: &str, max_len: usize| {
            !part.is_empty() && part.len() <= max_len && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(year, 4) || year.len() != 4 || !digits(week, 2) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let week: u32 = week.parse().map_err(|_| invalid())?;
        Self::new(year, week)
    }
}

impl Serialize for YearWeek {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearWeek {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yw(year: i32, week: u32) -> YearWeek {
        YearWeek::new(year, week).unwrap()
    }

    #[test]
    fn test_weeks_in_year_known_values() {
        assert_eq!(weeks_in_year(2015), 53);
        assert_eq!(weeks_in_year(2020), 53);
        assert_eq!(weeks_in_year(2024), 52);
        assert_eq!(weeks_in_year(2025), 52);
        assert_eq!(weeks_in_year(2026), 53);
    }

    #[test]
    fn test_weeks_in_year_matches_chrono() {
        for year in 1990..2060 {
            let dec28 = NaiveDate::from_ymd_opt(year, 12, 28).unwrap();
            assert_eq!(weeks_in_year(year), dec28.iso_week().week(), "year {year}");
        }
    }

    #[test]
    fn test_chronological_order_beats_string_order() {
        let late = yw(2025, 52);
        let early_next = yw(2026, 1);
        assert!(late < early_next);

        let mut weeks = vec![yw(2026, 1), yw(2025, 52), yw(2025, 9)];
        weeks.sort();
        assert_eq!(weeks, vec![yw(2025, 9), yw(2025, 52), yw(2026, 1)]);
    }

    #[test]
    fn test_parse_and_display() {
        let parsed: YearWeek = "2025-09".parse().unwrap();
        assert_eq!(parsed, yw(2025, 9));
        assert_eq!(parsed.to_string(), "2025-09");

        assert_eq!("2025-9".parse::<YearWeek>().unwrap(), yw(2025, 9));
        assert_eq!("2026-W53".parse::<YearWeek>().unwrap(), yw(2026, 53));
        assert_eq!(" 2025-10 ".parse::<YearWeek>().unwrap(), yw(2025, 10));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for bad in ["", "2025", "2025-", "25-01", "2025-abc", "2025-001", "2025/01", "-2025-01"] {
            assert!(
                matches!(bad.parse::<YearWeek>(), Err(PeriodError::InvalidFormat { .. })),
                "expected InvalidFormat for {bad:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_week_outside_year() {
        assert_eq!(
            "2025-53".parse::<YearWeek>(),
            Err(PeriodError::WeekOutOfRange {
                year: 2025,
                week: 53,
                max: 52
            })
        );
        assert!(matches!(
            "2025-00".parse::<YearWeek>(),
            Err(PeriodError::WeekOutOfRange { .. })
        ));
        assert!("2026-53".parse::<YearWeek>().is_ok());
    }

    #[test]
    fn test_next_and_prev_roll_over_year_boundary() {
        assert_eq!(yw(2025, 52).next(), Some(yw(2026, 1)));
        assert_eq!(yw(2026, 53).next(), Some(yw(2027, 1)));
        assert_eq!(yw(2027, 1).prev(), Some(yw(2026, 53)));
        assert_eq!(yw(2026, 1).prev(), Some(yw(2025, 52)));
        assert_eq!(yw(MAX_YEAR, weeks_in_year(MAX_YEAR)).next(), None);
        assert_eq!(yw(MIN_YEAR, 1).prev(), None);
    }

    #[test]
    fn test_from_date_uses_iso_year() {
        // 2024-12-30 is the Monday of ISO week 2025-01.
        let date = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        assert_eq!(YearWeek::from_date(date).unwrap(), yw(2025, 1));
        // 2027-01-01 is a Friday still inside ISO week 2026-53.
        let date = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
        assert_eq!(YearWeek::from_date(date).unwrap(), yw(2026, 53));
    }

    #[test]
    fn test_thursday_of_first_week_2025() {
        assert_eq!(
            yw(2025, 1).thursday(),
            NaiveDate::from_ymd_opt(2025, 1, 2)
        );
    }

    #[test]
    fn test_serde_uses_string_form() {
        let json = serde_json::to_string(&yw(2025, 3)).unwrap();
        assert_eq!(json, "\"2025-03\"");
        let back: YearWeek = serde_json::from_str("\"2026-53\"").unwrap();
        assert_eq!(back, yw(2026, 53));
        assert!(serde_json::from_str::<YearWeek>("\"2025-53\"").is_err());
    }
}
