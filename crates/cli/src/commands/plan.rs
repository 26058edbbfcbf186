//! The `plan` command: what an export run would do.
//!
//! Responsibilities:
//! - Expand the resolved period into ISO weeks relative to one "today".
//! - Drop weeks the cube does not have when an available-weeks list is given.
//! - Report the settings and notices that shape the run.
//!
//! Does NOT handle:
//! - Connecting to the cube or writing export files.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use olap_config::{AppConfig, ConfigNotice, ScheduleIntent};
use olap_period::{FixedClock, PeriodCalculator, YearWeek, intersect_with_available};
use serde::Serialize;

use crate::args::OutputFormat;
use crate::formatters::render_table;

/// Resolved export run, as printed by `plan`.
#[derive(Debug, Serialize)]
pub struct Plan<'a> {
    pub as_of: NaiveDate,
    pub profile: Option<&'a str>,
    pub period: String,
    pub weeks: Vec<YearWeek>,
    pub unavailable: Vec<YearWeek>,
    pub format: String,
    pub compress: String,
    pub result_dir: String,
    pub auth_method: String,
    /// Whether the run will read the credential vault.
    pub credentials_required: bool,
    pub schedule: Option<&'a ScheduleIntent>,
    pub notices: &'a [ConfigNotice],
}

/// Reads one `YYYY-WW` per line; blank lines and `#` comments are skipped.
pub fn read_available_weeks(path: &Path) -> Result<Vec<YearWeek>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read available weeks from {}", path.display()))?;

    let mut weeks = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let week = line
            .parse::<YearWeek>()
            .with_context(|| format!("{}:{}", path.display(), index + 1))?;
        weeks.push(week);
    }
    if weeks.is_empty() {
        bail!("{} lists no weeks", path.display());
    }
    Ok(weeks)
}

pub fn build_plan<'a>(
    config: &'a AppConfig,
    as_of: NaiveDate,
    available: Option<&[YearWeek]>,
) -> Result<Plan<'a>> {
    let calculator = PeriodCalculator::new(FixedClock(as_of));
    let requested = calculator
        .generate_year_week_pairs(config.period())
        .with_context(|| format!("Failed to expand period {}", config.period()))?;

    let (weeks, unavailable) = match available {
        Some(available) => {
            let kept = intersect_with_available(&requested, available.iter().copied());
            let dropped = requested
                .iter()
                .copied()
                .filter(|week| !kept.contains(week))
                .collect();
            (kept, dropped)
        }
        None => (requested, Vec::new()),
    };

    Ok(Plan {
        as_of,
        profile: config.profile(),
        period: config.period().to_string(),
        weeks,
        unavailable,
        format: config.export().format.to_string(),
        compress: config.export().compress.to_string(),
        result_dir: config.paths().result_dir.display().to_string(),
        auth_method: config.secrets().auth_method.to_string(),
        credentials_required: config.secrets().auth_method.requires_password(),
        schedule: config.schedule(),
        notices: config.notices(),
    })
}

fn render_text(plan: &Plan<'_>) -> String {
    let mut out = vec![
        format!("Profile:  {}", plan.profile.unwrap_or("-")),
        format!("Period:   {} (as of {})", plan.period, plan.as_of),
        format!(
            "Export:   {} (compress: {}) -> {}",
            plan.format, plan.compress, plan.result_dir
        ),
        if plan.credentials_required {
            format!("Auth:     {} (stored credentials required)", plan.auth_method)
        } else {
            format!("Auth:     {}", plan.auth_method)
        },
    ];
    if let Some(schedule) = plan.schedule {
        let when = schedule
            .cron
            .as_deref()
            .or(schedule.every.as_deref())
            .unwrap_or("-");
        let state = if schedule.enabled { "enabled" } else { "disabled" };
        out.push(format!("Schedule: {when} ({state})"));
    }

    out.push(String::new());
    let mut rows: Vec<Vec<String>> = plan
        .weeks
        .iter()
        .map(|w| vec![w.to_string(), "export".to_string()])
        .collect();
    rows.extend(
        plan.unavailable
            .iter()
            .map(|w| vec![w.to_string(), "not in cube".to_string()]),
    );
    rows.sort();
    out.push(render_table(&["WEEK", "STATUS"], &rows));

    if !plan.notices.is_empty() {
        out.push(String::new());
        out.push("Notices:".to_string());
        out.extend(plan.notices.iter().map(|n| format!("  - {n}")));
    }
    out.join("\n")
}

pub fn run(
    config: &AppConfig,
    as_of: NaiveDate,
    available_weeks: Option<&Path>,
    output: OutputFormat,
) -> Result<()> {
    let available = available_weeks.map(read_available_weeks).transpose()?;
    let plan = build_plan(config, as_of, available.as_deref())?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Table => println!("{}", render_text(&plan)),
    }
    Ok(())
}
