//! Period and schedule intent resolution.
//!
//! Unlike leaf fields, a period is resolved as a unit: the first source that
//! names one wins outright, so a profile's `last-month` is never mixed with a
//! start week from the environment.
//!
//! Priority: CLI period flag, then the profile `period` section, then the
//! `query.year_week_start`/`query.year_week_end` pair, then the current week.

use olap_period::{AutoPeriod, PeriodSpec};
use serde_yaml::{Mapping, Value};

use super::cli::CliOverrides;
use super::error::ConfigError;
use super::fields::{self, FieldValue, render, scalar_text};
use crate::persistence::RawProfile;
use crate::types::{QueryConfig, ScheduleIntent};

fn section<'a>(value: &'a Value, name: &str) -> Result<&'a Mapping, ConfigError> {
    value.as_mapping().ok_or_else(|| ConfigError::Validation {
        field: name.to_string(),
        value: render(value),
        message: "expected a mapping".to_string(),
    })
}

fn entry<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a Value> {
    mapping.get(key).filter(|v| !v.is_null())
}

fn entry_text(mapping: &Mapping, section: &str, key: &str) -> Result<Option<String>, ConfigError> {
    match entry(mapping, key) {
        None => Ok(None),
        Some(value) => scalar_text(value)
            .map(Some)
            .ok_or_else(|| ConfigError::Validation {
                field: format!("{section}.{key}"),
                value: render(value),
                message: "expected a single value".to_string(),
            }),
    }
}

fn required_text(mapping: &Mapping, section: &str, key: &str) -> Result<String, ConfigError> {
    entry_text(mapping, section, key)?.ok_or_else(|| ConfigError::Validation {
        field: format!("{section}.{key}"),
        value: String::new(),
        message: "is required".to_string(),
    })
}

/// Parses a profile `period` section.
///
/// `type` is `auto` or `manual`; when it is omitted the kind is inferred from
/// which keys are present.
pub(crate) fn parse_period_section(value: &Value) -> Result<PeriodSpec, ConfigError> {
    let mapping = section(value, "period")?;

    let kind = match entry_text(mapping, "period", "type")? {
        Some(kind) => kind.to_ascii_lowercase(),
        None if entry(mapping, "auto_type").is_some() => "auto".to_string(),
        None if entry(mapping, "start").is_some() || entry(mapping, "end").is_some() => {
            "manual".to_string()
        }
        None => {
            return Err(ConfigError::Validation {
                field: "period.type".to_string(),
                value: String::new(),
                message: "is required (auto or manual)".to_string(),
            });
        }
    };

    match kind.as_str() {
        "auto" => {
            let auto_type = required_text(mapping, "period", "auto_type")?;
            let auto_value = match entry(mapping, "auto_value") {
                None => None,
                Some(raw) => Some(parse_count(raw)?),
            };
            AutoPeriod::from_parts(&auto_type, auto_value)
                .map(PeriodSpec::Auto)
                .map_err(|source| ConfigError::Period {
                    field: "period.auto_type".to_string(),
                    source,
                })
        }
        "manual" => {
            let start = required_text(mapping, "period", "start")?;
            let end = required_text(mapping, "period", "end")?;
            PeriodSpec::from_bounds(&start, &end).map_err(|source| ConfigError::Period {
                field: "period".to_string(),
                source,
            })
        }
        other => Err(ConfigError::Validation {
            field: "period.type".to_string(),
            value: other.to_string(),
            message: "expected auto or manual".to_string(),
        }),
    }
}

/// Week counts may be negative in the file; the period crate rejects them.
fn parse_count(raw: &Value) -> Result<i64, ConfigError> {
    let parsed = match raw {
        Value::Number(n) => n.as_i64(),
        other => scalar_text(other).and_then(|t| t.parse::<i64>().ok()),
    };
    parsed.ok_or_else(|| ConfigError::Validation {
        field: "period.auto_value".to_string(),
        value: render(raw),
        message: "must be a whole number of weeks".to_string(),
    })
}

/// Short human description of a profile's period, for listings.
pub(crate) fn describe_period(profile: &RawProfile) -> String {
    match profile.period_section() {
        None => "current week".to_string(),
        Some(value) => match parse_period_section(value) {
            Ok(spec) => spec.to_string(),
            Err(e) => format!("invalid ({e})"),
        },
    }
}

pub(crate) fn resolve_period(
    cli: &CliOverrides,
    profile: Option<&RawProfile>,
    query: &QueryConfig,
) -> Result<PeriodSpec, ConfigError> {
    if let Some(spec) = cli.period() {
        return Ok(*spec);
    }
    if let Some(value) = profile.and_then(RawProfile::period_section) {
        return parse_period_section(value);
    }

    match (query.year_week_start, query.year_week_end) {
        (Some(start), Some(end)) => {
            PeriodSpec::range(start, end).map_err(|source| ConfigError::Period {
                field: fields::YEAR_WEEK_START.path.to_string(),
                source,
            })
        }
        (None, None) => Ok(PeriodSpec::CurrentWeek),
        (Some(start), None) => Err(ConfigError::Validation {
            field: fields::YEAR_WEEK_END.path.to_string(),
            value: String::new(),
            message: format!(
                "is required when {} is set ({start})",
                fields::YEAR_WEEK_START.path
            ),
        }),
        (None, Some(end)) => Err(ConfigError::Validation {
            field: fields::YEAR_WEEK_START.path.to_string(),
            value: String::new(),
            message: format!(
                "is required when {} is set ({end})",
                fields::YEAR_WEEK_END.path
            ),
        }),
    }
}

fn parse_schedule_section(value: &Value) -> Result<ScheduleIntent, ConfigError> {
    let mapping = section(value, "schedule")?;
    let enabled = match entry(mapping, "enabled") {
        None => false,
        Some(raw) => bool::from_raw(raw).map_err(|message| ConfigError::Validation {
            field: "schedule.enabled".to_string(),
            value: render(raw),
            message,
        })?,
    };
    Ok(ScheduleIntent {
        enabled,
        cron: entry_text(mapping, "schedule", "cron")?,
        every: entry_text(mapping, "schedule", "every")?,
        description: entry_text(mapping, "schedule", "description")?,
    })
}

/// Profile `schedule` section, with the CLI `--schedule` value layered on top.
pub(crate) fn resolve_schedule(
    cli: &CliOverrides,
    profile: Option<&RawProfile>,
) -> Result<Option<ScheduleIntent>, ConfigError> {
    let mut intent = profile
        .and_then(RawProfile::schedule_section)
        .map(parse_schedule_section)
        .transpose()?;

    if let Some(every) = cli.schedule() {
        let intent = intent.get_or_insert_with(ScheduleIntent::default);
        intent.every = Some(every.to_string());
        intent.enabled = true;
    }
    Ok(intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use olap_period::{PeriodError, YearWeek};

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_auto_period_section() {
        let spec =
            parse_period_section(&yaml("type: auto\nauto_type: last-weeks\nauto_value: 4\n"))
                .unwrap();
        assert_eq!(spec, PeriodSpec::Auto(AutoPeriod::LastWeeks(4)));

        let spec = parse_period_section(&yaml("type: AUTO\nauto_type: last_quarter\n")).unwrap();
        assert_eq!(spec, PeriodSpec::Auto(AutoPeriod::LastQuarter));
    }

    #[test]
    fn test_manual_period_section() {
        let spec =
            parse_period_section(&yaml("type: manual\nstart: \"2025-50\"\nend: \"2026-02\"\n"))
                .unwrap();
        assert_eq!(
            spec,
            PeriodSpec::Range {
                start: YearWeek::new(2025, 50).unwrap(),
                end: YearWeek::new(2026, 2).unwrap()
            }
        );
    }

    #[test]
    fn test_type_is_inferred() {
        assert_eq!(
            parse_period_section(&yaml("auto_type: year-to-date\n")).unwrap(),
            PeriodSpec::Auto(AutoPeriod::YearToDate)
        );
        assert!(matches!(
            parse_period_section(&yaml("start: 2025-01\nend: 2025-03\n")),
            Ok(PeriodSpec::Range { .. })
        ));
    }

    #[test]
    fn test_invalid_sections() {
        let err = parse_period_section(&yaml("type: auto\nauto_type: last-weeks\n")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Period {
                source: PeriodError::MissingCount { .. },
                ..
            }
        ));

        let err = parse_period_section(&yaml("type: auto\nauto_type: fortnight\n")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Period {
                source: PeriodError::UnknownIntent(_),
                ..
            }
        ));

        let err = parse_period_section(&yaml("type: manual\nstart: 2025-10\n")).unwrap_err();
        assert_eq!(err.field(), Some("period.end"));

        let err = parse_period_section(&yaml("type: sometimes\n")).unwrap_err();
        assert_eq!(err.field(), Some("period.type"));

        let err = parse_period_section(&yaml("last-month")).unwrap_err();
        assert_eq!(err.field(), Some("period"));
    }

    #[test]
    fn test_inverted_manual_range() {
        let err = parse_period_section(&yaml("type: manual\nstart: 2026-02\nend: 2025-50\n"))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Period {
                source: PeriodError::InvertedRange { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_schedule_cli_overrides_every() {
        let cli = CliOverrides::new().with_schedule("every monday at 09:00");
        let schedule = resolve_schedule(&cli, None).unwrap().unwrap();
        assert!(schedule.enabled);
        assert_eq!(schedule.every.as_deref(), Some("every monday at 09:00"));
        assert_eq!(schedule.cron, None);

        assert_eq!(resolve_schedule(&CliOverrides::new(), None).unwrap(), None);
    }

    #[test]
    fn test_schedule_section() {
        let schedule = parse_schedule_section(&yaml(
            "enabled: yes\ncron: \"0 9 1 * *\"\ndescription: Monthly\n",
        ))
        .unwrap();
        assert!(schedule.enabled);
        assert_eq!(schedule.cron.as_deref(), Some("0 9 1 * *"));
        assert_eq!(schedule.every, None);
    }
}
