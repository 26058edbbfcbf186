//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Turn passed flags into `CliOverrides` for the config resolver.
//! - Turn the period flags into a single `PeriodSpec`.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).
//! - Does not load configuration (see `config_context` module).
//!
//! Invariants:
//! - Only flags the user actually passed become overrides; no flag carries a
//!   clap default that could mask a profile value.
//! - At most one period flag (or the `--start`/`--end` pair) is accepted.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use olap_config::{CliOverrides, fields};
use olap_period::{AutoPeriod, PeriodError, PeriodSpec};

use crate::commands;

#[derive(Parser, Debug)]
#[command(name = "olap-export")]
#[command(about = "Export weekly OLAP cube data to XLSX/CSV files", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  olap-export --last-weeks 4\n  olap-export --period 2025-50:2026-02 --format csv\n  olap-export --profile monthly_report --output json plan\n  olap-export --as-of 2026-02-11 --current-month plan\n  olap-export profiles list\n  olap-export credentials save\n"
)]
pub struct Cli {
    #[command(flatten)]
    pub period: PeriodArgs,

    /// Export format (xlsx, csv, both)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Export CSV only, even when the format asks for a spreadsheet
    #[arg(long)]
    pub force_csv_only: bool,

    /// Product group (FG1) filter
    #[arg(long, value_name = "NAME")]
    pub filter: Option<String>,

    /// Query timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Compress exported files (none, zip)
    #[arg(long, value_name = "MODE")]
    pub compress: Option<String>,

    /// Directory for exported files
    #[arg(long, value_name = "DIR")]
    pub result_dir: Option<PathBuf>,

    /// Analysis server address
    #[arg(long, value_name = "HOST")]
    pub server: Option<String>,

    /// Cube database name
    #[arg(long, value_name = "NAME")]
    pub database: Option<String>,

    /// Authentication method (SSPI, LOGIN)
    #[arg(long, value_name = "METHOD")]
    pub auth_method: Option<String>,

    /// Profile name to load from the profiles directory
    #[arg(long)]
    pub profile: Option<String>,

    /// Recurring-run request, e.g. "every monday at 09:00"
    #[arg(long, value_name = "SPEC")]
    pub schedule: Option<String>,

    /// Verbose logging
    #[arg(long)]
    pub debug: bool,

    /// Path to the base settings file
    #[arg(long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Directory holding `<name>.yaml` profiles
    #[arg(long, value_name = "DIR")]
    pub profiles_dir: Option<PathBuf>,

    /// Compute relative periods as if today were this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// File listing the weeks the cube has, one YYYY-WW per line
    #[arg(long, value_name = "FILE")]
    pub available_weeks: Option<PathBuf>,

    /// Output format for command results
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("period_choice")
        .args([
            "period",
            "start",
            "last_weeks",
            "rolling_weeks",
            "current_month",
            "last_month",
            "current_quarter",
            "last_quarter",
            "year_to_date",
        ])
        .multiple(false)
))]
pub struct PeriodArgs {
    /// Manual range START:END, e.g. 2025-50:2026-02
    #[arg(long, value_name = "START:END")]
    pub period: Option<String>,

    /// First week of a manual range (YYYY-WW)
    #[arg(long, value_name = "YYYY-WW", requires = "end")]
    pub start: Option<String>,

    /// Last week of a manual range (YYYY-WW)
    #[arg(long, value_name = "YYYY-WW", requires = "start")]
    pub end: Option<String>,

    /// The last N weeks, ending with the current week
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub last_weeks: Option<i64>,

    /// Same as --last-weeks
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub rolling_weeks: Option<i64>,

    /// Weeks whose Thursday falls in the current month
    #[arg(long)]
    pub current_month: bool,

    /// Weeks whose Thursday falls in the previous month
    #[arg(long)]
    pub last_month: bool,

    /// Weeks whose Thursday falls in the current quarter
    #[arg(long)]
    pub current_quarter: bool,

    /// Weeks whose Thursday falls in the previous quarter
    #[arg(long)]
    pub last_quarter: bool,

    /// Week 1 of this year through the current week
    #[arg(long)]
    pub year_to_date: bool,
}

impl PeriodArgs {
    /// The period intent named by the flags, if any.
    pub fn to_spec(&self) -> Result<Option<PeriodSpec>, PeriodError> {
        if let Some(range) = &self.period {
            return PeriodSpec::parse_range(range).map(Some);
        }
        if let (Some(start), Some(end)) = (&self.start, &self.end) {
            return PeriodSpec::from_bounds(start, end).map(Some);
        }

        let (kind, count) = if self.last_weeks.is_some() {
            ("last-weeks", self.last_weeks)
        } else if self.rolling_weeks.is_some() {
            ("rolling-weeks", self.rolling_weeks)
        } else if self.current_month {
            ("current-month", None)
        } else if self.last_month {
            ("last-month", None)
        } else if self.current_quarter {
            ("current-quarter", None)
        } else if self.last_quarter {
            ("last-quarter", None)
        } else if self.year_to_date {
            ("year-to-date", None)
        } else {
            return Ok(None);
        };
        AutoPeriod::from_parts(kind, count).map(|auto| Some(PeriodSpec::Auto(auto)))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the resolved weeks and settings for an export run (default)
    Plan,

    /// Manage export profiles
    Profiles {
        #[command(subcommand)]
        command: commands::profiles::ProfilesCommand,
    },

    /// Manage stored LOGIN credentials
    Credentials {
        #[command(subcommand)]
        command: commands::credentials::CredentialsCommand,
    },

    /// Delete stored credentials (alias of `credentials clear`)
    #[command(name = "clear_credentials")]
    ClearCredentials,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    /// Passed flags as resolver overrides, keyed by dotted field path.
    pub fn overrides(&self) -> Result<CliOverrides, PeriodError> {
        let mut cli = CliOverrides::new();

        let text_flags = [
            (&fields::EXPORT_FORMAT, &self.format),
            (&fields::FILTER_FG1_NAME, &self.filter),
            (&fields::COMPRESS, &self.compress),
            (&fields::SERVER, &self.server),
            (&fields::DATABASE, &self.database),
            (&fields::AUTH_METHOD, &self.auth_method),
        ];
        for (field, value) in text_flags {
            if let Some(value) = value {
                cli.set(field.path, value.clone());
            }
        }
        if let Some(timeout) = self.timeout {
            cli.set(fields::QUERY_TIMEOUT.path, timeout.to_string());
        }
        if let Some(dir) = &self.result_dir {
            cli.set(fields::RESULT_DIR.path, dir.display().to_string());
        }
        if self.force_csv_only {
            cli.set(fields::FORCE_CSV_ONLY.path, "true");
        }
        if self.debug {
            cli.set(fields::DEBUG.path, "true");
        }

        if let Some(period) = self.period.to_spec()? {
            cli = cli.with_period(period);
        }
        if let Some(schedule) = &self.schedule {
            cli = cli.with_schedule(schedule.clone());
        }
        Ok(cli)
    }
}
