//! Centralized constants for the OLAP export workspace.
//!
//! Default values, file locations, and environment key names shared by the
//! resolver, the credential vault, and the CLI.

// =============================================================================
// File Locations
// =============================================================================

/// Base settings file, relative to the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "config.yaml";

/// Directory holding one YAML file per named profile.
pub const DEFAULT_PROFILES_DIR: &str = "profiles";

/// Encrypted credential record.
pub const DEFAULT_CREDENTIALS_FILE: &str = ".credentials";

// =============================================================================
// Field Defaults
// =============================================================================

/// Default cube query timeout in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_CSV_DELIMITER: &str = ";";

pub const DEFAULT_CSV_ENCODING: &str = "utf-8-sig";

/// Header fill colour (RGB hex, no leading `#`).
pub const DEFAULT_HEADER_COLOR: &str = "00365E";

pub const DEFAULT_HEADER_FONT_COLOR: &str = "FFFFFF";

pub const DEFAULT_HEADER_FONT_SIZE: u32 = 11;

/// Directory containing the vendor client libraries.
pub const DEFAULT_ADOMD_DLL_PATH: &str = "./lib";

pub const DEFAULT_RESULT_DIR: &str = "result";

pub const DEFAULT_PROGRESS_UPDATE_INTERVAL_MS: u64 = 100;

// =============================================================================
// Credentials
// =============================================================================

/// Total passphrase attempts before an interactive decrypt gives up.
pub const MAX_PASSWORD_ATTEMPTS: u32 = 3;

/// On-disk format version of the credential record.
pub const CREDENTIAL_FILE_VERSION: u32 = 1;

/// Key-derivation function name recorded in the credential file.
pub const CREDENTIAL_KDF: &str = "argon2id";

// =============================================================================
// Environment Keys (current generation, not deprecated)
// =============================================================================

pub const ENV_SERVER: &str = "OLAP_SERVER";
pub const ENV_DATABASE: &str = "OLAP_DATABASE";
pub const ENV_AUTH_METHOD: &str = "OLAP_AUTH_METHOD";
pub const ENV_DOMAIN: &str = "OLAP_DOMAIN";
pub const ENV_PORT: &str = "OLAP_PORT";
pub const ENV_HTTP_URL: &str = "OLAP_HTTP_URL";
pub const ENV_TIMEOUT: &str = "OLAP_TIMEOUT";
pub const ENV_CREDENTIALS_FILE: &str = "OLAP_CREDENTIALS_FILE";
pub const ENV_USE_MASTER_PASSWORD: &str = "OLAP_USE_MASTER_PASSWORD";
pub const ENV_MASTER_PASSWORD: &str = "OLAP_MASTER_PASSWORD";

/// Disables `.env` loading when set to `1` or `true`.
pub const ENV_DOTENV_DISABLED: &str = "DOTENV_DISABLED";
