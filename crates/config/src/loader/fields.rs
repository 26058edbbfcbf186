//! The field catalog and value coercion.
//!
//! Responsibilities:
//! - Declare every leaf setting once: dotted path, legacy env key, default, scope.
//! - Coerce raw input (YAML scalars, or text from CLI/env) into typed values.
//!
//! Does NOT handle:
//! - Choosing which source supplies a value (see `providers.rs`).
//! - Cross-field rules (see `builder.rs`).
//!
//! Invariants:
//! - Every path in [`ALL`] is unique and has the form `section.key`.
//! - Defaults are stored as text and go through the same coercion as user input.

use std::path::PathBuf;

use olap_period::YearWeek;
use secrecy::SecretString;
use serde_yaml::Value;

use crate::constants::*;
use crate::types::{AuthMethod, Compression, CsvQuoting, ExportFormat};

/// Which sources may supply a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Any source.
    General,
    /// CLI and environment only; profiles and the settings file are never consulted.
    Secret,
}

/// An environment key feeding a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvKey {
    pub name: &'static str,
    /// Legacy flat key; using it produces a deprecation notice.
    pub deprecated: bool,
}

/// Declaration of one leaf setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub path: &'static str,
    pub env: Option<EnvKey>,
    pub default: Option<&'static str>,
    pub scope: Scope,
}

impl FieldSpec {
    /// `(section, key)` halves of the dotted path.
    pub fn split(&self) -> (&'static str, &'static str) {
        self.path.split_once('.').unwrap_or((self.path, ""))
    }
}

const fn secret(path: &'static str, env: &'static str, default: Option<&'static str>) -> FieldSpec {
    FieldSpec {
        path,
        env: Some(EnvKey {
            name: env,
            deprecated: false,
        }),
        default,
        scope: Scope::Secret,
    }
}

const fn general(
    path: &'static str,
    env: Option<&'static str>,
    default: Option<&'static str>,
) -> FieldSpec {
    let env = match env {
        Some(name) => Some(EnvKey {
            name,
            deprecated: true,
        }),
        None => None,
    };
    FieldSpec {
        path,
        env,
        default,
        scope: Scope::General,
    }
}

pub const SERVER: FieldSpec = secret("secrets.server", ENV_SERVER, None);
pub const DATABASE: FieldSpec = secret("secrets.database", ENV_DATABASE, None);
pub const AUTH_METHOD: FieldSpec = secret("secrets.auth_method", ENV_AUTH_METHOD, Some("SSPI"));
pub const DOMAIN: FieldSpec = secret("secrets.domain", ENV_DOMAIN, None);
pub const PORT: FieldSpec = secret("secrets.port", ENV_PORT, None);
pub const HTTP_URL: FieldSpec = secret("secrets.http_url", ENV_HTTP_URL, None);
pub const CONNECTION_TIMEOUT: FieldSpec = secret("secrets.timeout", ENV_TIMEOUT, None);
pub const CREDENTIALS_FILE: FieldSpec = secret(
    "secrets.credentials_file",
    ENV_CREDENTIALS_FILE,
    Some(DEFAULT_CREDENTIALS_FILE),
);
pub const USE_MASTER_PASSWORD: FieldSpec =
    secret("secrets.use_master_password", ENV_USE_MASTER_PASSWORD, Some("false"));
pub const MASTER_PASSWORD: FieldSpec = secret("secrets.master_password", ENV_MASTER_PASSWORD, None);

pub const FILTER_FG1_NAME: FieldSpec =
    general("query.filter_fg1_name", Some("FILTER_FG1_NAME"), None);
pub const YEAR_WEEK_START: FieldSpec =
    general("query.year_week_start", Some("YEAR_WEEK_START"), None);
pub const YEAR_WEEK_END: FieldSpec = general("query.year_week_end", Some("YEAR_WEEK_END"), None);
pub const QUERY_TIMEOUT: FieldSpec = general("query.timeout", Some("QUERY_TIMEOUT"), Some("30"));

pub const EXPORT_FORMAT: FieldSpec = general("export.format", Some("EXPORT_FORMAT"), Some("xlsx"));
pub const FORCE_CSV_ONLY: FieldSpec =
    general("export.force_csv_only", Some("FORCE_CSV_ONLY"), Some("false"));
pub const COMPRESS: FieldSpec = general("export.compress", None, Some("none"));

pub const XLSX_STREAMING: FieldSpec =
    general("xlsx.streaming", Some("XLSX_STREAMING"), Some("false"));
pub const XLSX_MIN_FORMAT: FieldSpec =
    general("xlsx.min_format", Some("XLSX_MIN_FORMAT"), Some("false"));

pub const CSV_DELIMITER: FieldSpec =
    general("csv.delimiter", Some("CSV_DELIMITER"), Some(DEFAULT_CSV_DELIMITER));
pub const CSV_ENCODING: FieldSpec =
    general("csv.encoding", Some("CSV_ENCODING"), Some(DEFAULT_CSV_ENCODING));
pub const CSV_QUOTING: FieldSpec = general("csv.quoting", Some("CSV_QUOTING"), Some("minimal"));

pub const HEADER_COLOR: FieldSpec = general(
    "excel_header.color",
    Some("EXCEL_HEADER_COLOR"),
    Some(DEFAULT_HEADER_COLOR),
);
pub const HEADER_FONT_COLOR: FieldSpec = general(
    "excel_header.font_color",
    Some("EXCEL_HEADER_FONT_COLOR"),
    Some(DEFAULT_HEADER_FONT_COLOR),
);
pub const HEADER_FONT_SIZE: FieldSpec = general(
    "excel_header.font_size",
    Some("EXCEL_HEADER_FONT_SIZE"),
    Some("11"),
);

pub const ADOMD_DLL: FieldSpec = general(
    "paths.adomd_dll",
    Some("ADOMD_DLL_PATH"),
    Some(DEFAULT_ADOMD_DLL_PATH),
);
pub const RESULT_DIR: FieldSpec = general("paths.result_dir", None, Some(DEFAULT_RESULT_DIR));

pub const ASCII_LOGS: FieldSpec =
    general("display.ascii_logs", Some("OLAP_ASCII_LOGS"), Some("false"));
pub const DEBUG: FieldSpec = general("display.debug", Some("DEBUG"), Some("false"));
pub const PROGRESS_UPDATE_INTERVAL_MS: FieldSpec = general(
    "display.progress_update_interval_ms",
    Some("PROGRESS_UPDATE_INTERVAL_MS"),
    Some("100"),
);

/// Every declared field, in section order.
pub const ALL: &[FieldSpec] = &[
    SERVER,
    DATABASE,
    AUTH_METHOD,
    DOMAIN,
    PORT,
    HTTP_URL,
    CONNECTION_TIMEOUT,
    CREDENTIALS_FILE,
    USE_MASTER_PASSWORD,
    MASTER_PASSWORD,
    FILTER_FG1_NAME,
    YEAR_WEEK_START,
    YEAR_WEEK_END,
    QUERY_TIMEOUT,
    EXPORT_FORMAT,
    FORCE_CSV_ONLY,
    COMPRESS,
    XLSX_STREAMING,
    XLSX_MIN_FORMAT,
    CSV_DELIMITER,
    CSV_ENCODING,
    CSV_QUOTING,
    HEADER_COLOR,
    HEADER_FONT_COLOR,
    HEADER_FONT_SIZE,
    ADOMD_DLL,
    RESULT_DIR,
    ASCII_LOGS,
    DEBUG,
    PROGRESS_UPDATE_INTERVAL_MS,
];

/// Looks up a field by its dotted path.
pub fn by_path(path: &str) -> Option<&'static FieldSpec> {
    ALL.iter().find(|field| field.path == path)
}

/// Renders a raw value for error messages.
pub(crate) fn render(value: &Value) -> String {
    match scalar_text(value) {
        Some(text) => text,
        None => serde_yaml::to_string(value)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// Text form of a scalar; `None` for null, sequences, and mappings.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Conversion from a raw input value to a typed field value.
pub(crate) trait FieldValue: Sized {
    /// Coerces `raw`; the error is a human-readable reason.
    fn from_raw(raw: &Value) -> Result<Self, String>;

    /// Value used when no source, not even a default, supplies one.
    fn when_absent() -> Option<Self> {
        None
    }
}

fn text(raw: &Value) -> Result<String, String> {
    scalar_text(raw).ok_or_else(|| "expected a single value".to_string())
}

fn parse_bool(raw: &Value) -> Result<bool, String> {
    if let Value::Bool(b) = raw {
        return Ok(*b);
    }
    match text(raw)?.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err("expected true/false, 1/0, yes/no, or on/off".to_string()),
    }
}

fn parse_unsigned(raw: &Value) -> Result<u64, String> {
    if let Value::Number(n) = raw {
        if let Some(v) = n.as_u64() {
            return Ok(v);
        }
        if n.as_i64().is_some_and(|v| v < 0) {
            return Err("must be non-negative".to_string());
        }
        return Err("must be a whole number".to_string());
    }
    let text = text(raw)?;
    match text.parse::<i128>() {
        Ok(v) if v < 0 => Err("must be non-negative".to_string()),
        Ok(v) => u64::try_from(v).map_err(|_| "is too large".to_string()),
        Err(_) => Err("must be a whole number".to_string()),
    }
}

impl FieldValue for bool {
    fn from_raw(raw: &Value) -> Result<Self, String> {
        parse_bool(raw)
    }
}

impl FieldValue for u64 {
    fn from_raw(raw: &Value) -> Result<Self, String> {
        parse_unsigned(raw)
    }
}

impl FieldValue for u32 {
    fn from_raw(raw: &Value) -> Result<Self, String> {
        let v = parse_unsigned(raw)?;
        u32::try_from(v).map_err(|_| format!("must be at most {}", u32::MAX))
    }
}

impl FieldValue for u16 {
    fn from_raw(raw: &Value) -> Result<Self, String> {
        let v = parse_unsigned(raw)?;
        u16::try_from(v).map_err(|_| format!("must be at most {}", u16::MAX))
    }
}

impl FieldValue for String {
    fn from_raw(raw: &Value) -> Result<Self, String> {
        text(raw)
    }
}

impl FieldValue for PathBuf {
    fn from_raw(raw: &Value) -> Result<Self, String> {
        let text = text(raw)?;
        if text.is_empty() {
            return Err("path must not be empty".to_string());
        }
        Ok(PathBuf::from(text))
    }
}

impl FieldValue for SecretString {
    fn from_raw(raw: &Value) -> Result<Self, String> {
        Ok(SecretString::new(text(raw)?.into()))
    }
}

macro_rules! field_value_via_from_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn from_raw(raw: &Value) -> Result<Self, String> {
                    text(raw)?.parse::<$ty>().map_err(|e| e.to_string())
                }
            }
        )+
    };
}

field_value_via_from_str!(AuthMethod, ExportFormat, Compression, CsvQuoting, YearWeek);

/// Optional fields: null or blank input means "no value".
impl<T: FieldValue> FieldValue for Option<T> {
    fn from_raw(raw: &Value) -> Result<Self, String> {
        match raw {
            Value::Null => Ok(None),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            other => T::from_raw(other).map(Some),
        }
    }

    fn when_absent() -> Option<Self> {
        Some(None)
    }
}
