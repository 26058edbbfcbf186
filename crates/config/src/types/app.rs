//! The resolved configuration root.

use std::fmt;

use olap_period::PeriodSpec;
use serde::Serialize;

use super::options::ExportFormat;
use super::sections::{
    CsvConfig, DisplayConfig, ExcelHeaderConfig, ExportConfig, PathsConfig, QueryConfig,
    SecretsConfig, XlsxConfig,
};

/// A fully resolved, validated configuration tree.
///
/// Only the loader can construct one, and it hands out shared references to its
/// sections, so a built `AppConfig` cannot change for the rest of the run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub(crate) secrets: SecretsConfig,
    pub(crate) query: QueryConfig,
    pub(crate) export: ExportConfig,
    pub(crate) xlsx: XlsxConfig,
    pub(crate) csv: CsvConfig,
    pub(crate) excel_header: ExcelHeaderConfig,
    pub(crate) paths: PathsConfig,
    pub(crate) display: DisplayConfig,
    pub(crate) period: PeriodSpec,
    pub(crate) schedule: Option<ScheduleIntent>,
    pub(crate) profile: Option<String>,
    pub(crate) notices: Vec<ConfigNotice>,
}

impl AppConfig {
    pub fn secrets(&self) -> &SecretsConfig {
        &self.secrets
    }

    pub fn query(&self) -> &QueryConfig {
        &self.query
    }

    pub fn export(&self) -> &ExportConfig {
        &self.export
    }

    pub fn xlsx(&self) -> &XlsxConfig {
        &self.xlsx
    }

    pub fn csv(&self) -> &CsvConfig {
        &self.csv
    }

    pub fn excel_header(&self) -> &ExcelHeaderConfig {
        &self.excel_header
    }

    pub fn paths(&self) -> &PathsConfig {
        &self.paths
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    /// The period intent that drives the export loop.
    pub fn period(&self) -> &PeriodSpec {
        &self.period
    }

    pub fn schedule(&self) -> Option<&ScheduleIntent> {
        self.schedule.as_ref()
    }

    /// Name of the profile that contributed values, if any.
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Overrides and deprecations recorded while resolving.
    pub fn notices(&self) -> &[ConfigNotice] {
        &self.notices
    }
}

/// Recurring-run request carried by a profile or the CLI.
///
/// Executing the schedule is up to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleIntent {
    pub enabled: bool,
    pub cron: Option<String>,
    /// Simple form such as `every monday at 09:00`.
    pub every: Option<String>,
    pub description: Option<String>,
}

/// Something the resolver changed or tolerated that the user should know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigNotice {
    /// Legacy environment keys supplied values.
    DeprecatedEnv { keys: Vec<String> },
    /// A profile used a legacy key path that was rewritten.
    DeprecatedProfileKey {
        profile: String,
        from: String,
        to: String,
    },
    /// Spreadsheet output was requested but `force_csv_only` switched it off.
    ForcedCsvOnly { requested: ExportFormat },
    /// A settings file or profile contained a `secrets` section, which is never read.
    IgnoredSecrets { source: String },
}

impl fmt::Display for ConfigNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeprecatedEnv { keys } => write!(
                f,
                "deprecated environment keys in use: {} (move them to config.yaml or a profile)",
                keys.join(", ")
            ),
            Self::DeprecatedProfileKey { profile, from, to } => {
                write!(f, "profile '{profile}': '{from}' is deprecated, use '{to}'")
            }
            Self::ForcedCsvOnly { requested } => write!(
                f,
                "export format '{requested}' overridden to 'csv' because force_csv_only is set"
            ),
            Self::IgnoredSecrets { source } => {
                write!(f, "ignored 'secrets' section in {source}; secrets come from CLI or environment only")
            }
        }
    }
}
