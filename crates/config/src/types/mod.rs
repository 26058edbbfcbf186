//! Configuration type definitions for OLAP exports.
//!
//! Responsibilities:
//! - Define the typed configuration tree (`AppConfig` and its sections).
//! - Define the closed choice sets (format, compression, quoting, auth method).
//! - Define the notices the resolver reports alongside a built tree.
//!
//! Does NOT handle:
//! - Resolving values from inputs (see `loader` module).
//! - Reading or writing profiles (see `persistence` module).
//!
//! Invariants:
//! - All secret values use `secrecy::SecretString` to prevent accidental logging.
//! - `AppConfig` fields are crate-private; consumers only get shared references.

mod app;
mod options;
mod sections;

pub use app::{AppConfig, ConfigNotice, ScheduleIntent};
pub use options::{AuthMethod, Compression, CsvQuoting, ExportFormat, UnknownChoice};
pub use sections::{
    CsvConfig, DisplayConfig, ExcelHeaderConfig, ExportConfig, PathsConfig, QueryConfig,
    SecretsConfig, XlsxConfig,
};
