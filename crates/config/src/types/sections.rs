//! Typed configuration sections.
//!
//! Responsibilities:
//! - Define one struct per named section of the configuration tree.
//! - Carry already-validated values; no parsing happens here.
//!
//! Does NOT handle:
//! - Resolving values from CLI, profile, environment, or file (see `loader`).
//!
//! Invariants:
//! - `SecretsConfig` is only ever populated from CLI and environment sources.
//! - `SecretsConfig` is never serialized; its `Debug` output hides the master password.

use std::path::PathBuf;

use olap_period::YearWeek;
use secrecy::SecretString;
use serde::Serialize;

use super::options::{AuthMethod, Compression, CsvQuoting, ExportFormat};

/// Connection and credential settings.
#[derive(Debug, Clone)]
pub struct SecretsConfig {
    pub server: Option<String>,
    pub database: Option<String>,
    pub auth_method: AuthMethod,
    pub domain: Option<String>,
    pub port: Option<u16>,
    /// HTTP endpoint used instead of a server name when set.
    pub http_url: Option<String>,
    /// Connection timeout in seconds.
    pub timeout: Option<u64>,
    pub credentials_file: PathBuf,
    pub use_master_password: bool,
    pub master_password: Option<SecretString>,
}

/// Cube query settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryConfig {
    /// Product-group filter applied to every weekly query.
    pub filter_fg1_name: Option<String>,
    pub year_week_start: Option<YearWeek>,
    pub year_week_end: Option<YearWeek>,
    /// Query timeout in seconds.
    pub timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportConfig {
    /// Effective format, after the force-CSV rule has been applied.
    pub format: ExportFormat,
    pub force_csv_only: bool,
    pub compress: Compression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XlsxConfig {
    pub streaming: bool,
    pub min_format: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvConfig {
    pub delimiter: char,
    pub encoding: String,
    pub quoting: CsvQuoting,
}

/// Spreadsheet header styling. Colours are upper-case RGB hex without `#`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcelHeaderConfig {
    pub color: String,
    pub font_color: String,
    pub font_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathsConfig {
    pub adomd_dll: PathBuf,
    pub result_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayConfig {
    pub ascii_logs: bool,
    pub debug: bool,
    pub progress_update_interval_ms: u64,
}
