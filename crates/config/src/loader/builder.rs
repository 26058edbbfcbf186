//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` that gathers CLI overrides, an
//!   environment snapshot, the settings file, and an optional profile.
//! - Resolve every catalog field through the ordered providers.
//! - Apply cross-field rules and assemble the immutable `AppConfig`.
//!
//! Does NOT handle:
//! - Reading process environment (the caller supplies an `EnvMap`).
//! - Profile file parsing or key migration (see `persistence::profiles`).
//! - Turning the period intent into weeks (see the `olap-period` crate).
//!
//! Invariants / Assumptions:
//! - Per-field priority: CLI > profile > legacy environment > settings file > default.
//! - Secret fields skip the profile and settings-file providers.
//! - Deprecated environment keys produce one warning per build, listing every key used.
//! - `build` either returns a complete tree or an error; nothing partial escapes.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde_yaml::Value;

use super::cli::CliOverrides;
use super::env::{EnvMap, load_dotenv};
use super::error::ConfigError;
use super::fields::{self, FieldSpec, FieldValue, render};
use super::period::{resolve_period, resolve_schedule};
use super::providers::{
    CliProvider, DefaultProvider, EnvProvider, ProfileProvider, SettingsProvider, Source,
    ValueProvider,
};
use super::settings::SettingsFile;
use crate::constants::{DEFAULT_PROFILES_DIR, DEFAULT_SETTINGS_FILE};
use crate::persistence::{ProfileStore, RawProfile};
use crate::types::{
    AppConfig, ConfigNotice, CsvConfig, DisplayConfig, ExcelHeaderConfig, ExportConfig,
    ExportFormat, PathsConfig, QueryConfig, SecretsConfig, XlsxConfig,
};

/// Configuration loader that builds an `AppConfig` from all inputs.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    cli: CliOverrides,
    env: EnvMap,
    settings: Option<SettingsFile>,
    settings_path: Option<PathBuf>,
    profiles_dir: Option<PathBuf>,
    profile_name: Option<String>,
}

impl ConfigLoader {
    /// Create a new configuration loader with no inputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load environment variables from a .env file if present.
    ///
    /// Call before [`with_env`](Self::with_env) captures the environment.
    /// Skipped when `DOTENV_DISABLED` is `true` or `1`.
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        load_dotenv()?;
        Ok(self)
    }

    pub fn with_cli(mut self, cli: CliOverrides) -> Self {
        self.cli = cli;
        self
    }

    /// Use this environment snapshot for legacy keys and secrets.
    pub fn with_env(mut self, env: EnvMap) -> Self {
        self.env = env;
        self
    }

    /// Read the settings file from `path` instead of `config.yaml`.
    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    /// Use already-parsed settings; takes precedence over a settings path.
    pub fn with_settings(mut self, settings: SettingsFile) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_profiles_dir(mut self, dir: PathBuf) -> Self {
        self.profiles_dir = Some(dir);
        self
    }

    /// Set the profile whose values sit between CLI and environment.
    pub fn with_profile_name(mut self, name: String) -> Self {
        self.profile_name = Some(name);
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let settings = match self.settings {
            Some(settings) => settings,
            None => SettingsFile::load(
                &self
                    .settings_path
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE)),
            )?,
        };

        let profile = match self.profile_name {
            Some(name) => {
                let dir = self
                    .profiles_dir
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_PROFILES_DIR));
                Some(ProfileStore::new(dir).load(&name)?)
            }
            None => None,
        };

        resolve(&self.cli, profile.as_ref(), &self.env, &settings)
    }
}

/// Walks the providers for each field and records deprecated env key usage.
struct Resolver<'a> {
    providers: Vec<Box<dyn ValueProvider + 'a>>,
    deprecated_env: BTreeSet<&'static str>,
}

impl<'a> Resolver<'a> {
    fn new(
        cli: &'a CliOverrides,
        profile: Option<&'a RawProfile>,
        env: &'a EnvMap,
        settings: &'a SettingsFile,
    ) -> Self {
        let mut providers: Vec<Box<dyn ValueProvider + 'a>> = vec![Box::new(CliProvider(cli))];
        if let Some(profile) = profile {
            providers.push(Box::new(ProfileProvider(profile)));
        }
        providers.push(Box::new(EnvProvider(env)));
        providers.push(Box::new(SettingsProvider(settings)));
        providers.push(Box::new(DefaultProvider));
        Self {
            providers,
            deprecated_env: BTreeSet::new(),
        }
    }

    fn raw(&mut self, field: &FieldSpec) -> Option<(Value, Source)> {
        let (value, source) = self
            .providers
            .iter()
            .find_map(|provider| provider.lookup(field).map(|v| (v, provider.source())))?;

        if source == Source::Env
            && let Some(key) = field.env
            && key.deprecated
        {
            self.deprecated_env.insert(key.name);
        }
        tracing::trace!(field = field.path, %source, "Resolved field");
        Some((value, source))
    }

    fn get<T: FieldValue>(&mut self, field: &FieldSpec) -> Result<T, ConfigError> {
        match self.raw(field) {
            Some((value, source)) => T::from_raw(&value).map_err(|message| {
                ConfigError::invalid(field, render(&value), format!("{message} (from {source})"))
            }),
            None => T::when_absent().ok_or_else(|| ConfigError::invalid(field, "", "is required")),
        }
    }

    /// Like `get`, plus a rule that may reject or normalize the typed value.
    fn get_checked<T: FieldValue, U>(
        &mut self,
        field: &FieldSpec,
        check: impl FnOnce(T) -> Result<U, String>,
    ) -> Result<U, ConfigError> {
        let value: T = self.get(field)?;
        let shown = self
            .raw(field)
            .map(|(raw, _)| render(&raw))
            .unwrap_or_default();
        check(value).map_err(|message| ConfigError::invalid(field, shown, message))
    }
}

fn single_char(value: String) -> Result<char, String> {
    if matches!(value.as_str(), "\\t" | "tab" | "TAB") {
        return Ok('\t');
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err("must be exactly one character".to_string()),
    }
}

fn hex_color(value: String) -> Result<String, String> {
    let digits = value.strip_prefix('#').unwrap_or(&value);
    if digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(digits.to_ascii_uppercase())
    } else {
        Err("must be a 6-digit RGB hex colour such as 00365E".to_string())
    }
}

fn positive(value: u32) -> Result<u32, String> {
    if value == 0 {
        Err("must be greater than zero".to_string())
    } else {
        Ok(value)
    }
}

fn non_empty(value: String) -> Result<String, String> {
    if value.is_empty() {
        Err("must not be empty".to_string())
    } else {
        Ok(value)
    }
}

/// Resolves every field from the given inputs into a validated `AppConfig`.
pub fn resolve(
    cli: &CliOverrides,
    profile: Option<&RawProfile>,
    env: &EnvMap,
    settings: &SettingsFile,
) -> Result<AppConfig, ConfigError> {
    for path in cli.paths() {
        if fields::by_path(path).is_none() {
            tracing::warn!(path, "Ignoring command-line override for unknown setting");
        }
    }

    let mut notices = Vec::new();
    if settings.secrets_ignored() {
        notices.push(ConfigNotice::IgnoredSecrets {
            source: settings
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "settings".to_string()),
        });
    }
    if let Some(profile) = profile {
        if profile.secrets_ignored() {
            notices.push(ConfigNotice::IgnoredSecrets {
                source: format!("profile '{}'", profile.name()),
            });
        }
        notices.extend(
            profile
                .migrations()
                .iter()
                .map(|m| ConfigNotice::DeprecatedProfileKey {
                    profile: profile.name().to_string(),
                    from: m.from.to_string(),
                    to: m.to.to_string(),
                }),
        );
    }

    let mut r = Resolver::new(cli, profile, env, settings);

    let secrets = SecretsConfig {
        server: r.get(&fields::SERVER)?,
        database: r.get(&fields::DATABASE)?,
        auth_method: r.get(&fields::AUTH_METHOD)?,
        domain: r.get(&fields::DOMAIN)?,
        port: r.get(&fields::PORT)?,
        http_url: r.get(&fields::HTTP_URL)?,
        timeout: r.get(&fields::CONNECTION_TIMEOUT)?,
        credentials_file: r.get(&fields::CREDENTIALS_FILE)?,
        use_master_password: r.get(&fields::USE_MASTER_PASSWORD)?,
        master_password: r.get(&fields::MASTER_PASSWORD)?,
    };

    let query = QueryConfig {
        filter_fg1_name: r.get(&fields::FILTER_FG1_NAME)?,
        year_week_start: r.get(&fields::YEAR_WEEK_START)?,
        year_week_end: r.get(&fields::YEAR_WEEK_END)?,
        timeout: r.get(&fields::QUERY_TIMEOUT)?,
    };

    let requested: ExportFormat = r.get(&fields::EXPORT_FORMAT)?;
    let force_csv_only: bool = r.get(&fields::FORCE_CSV_ONLY)?;
    let format = if force_csv_only && requested.includes_xlsx() {
        tracing::warn!(
            requested = %requested,
            "force_csv_only is set; exporting CSV only"
        );
        notices.push(ConfigNotice::ForcedCsvOnly { requested });
        ExportFormat::Csv
    } else {
        requested
    };
    let export = ExportConfig {
        format,
        force_csv_only,
        compress: r.get(&fields::COMPRESS)?,
    };

    let xlsx = XlsxConfig {
        streaming: r.get(&fields::XLSX_STREAMING)?,
        min_format: r.get(&fields::XLSX_MIN_FORMAT)?,
    };

    let csv = CsvConfig {
        delimiter: r.get_checked(&fields::CSV_DELIMITER, single_char)?,
        encoding: r.get_checked(&fields::CSV_ENCODING, non_empty)?,
        quoting: r.get(&fields::CSV_QUOTING)?,
    };

    let excel_header = ExcelHeaderConfig {
        color: r.get_checked(&fields::HEADER_COLOR, hex_color)?,
        font_color: r.get_checked(&fields::HEADER_FONT_COLOR, hex_color)?,
        font_size: r.get_checked(&fields::HEADER_FONT_SIZE, positive)?,
    };

    let paths = PathsConfig {
        adomd_dll: r.get(&fields::ADOMD_DLL)?,
        result_dir: r.get(&fields::RESULT_DIR)?,
    };

    let display = DisplayConfig {
        ascii_logs: r.get(&fields::ASCII_LOGS)?,
        debug: r.get(&fields::DEBUG)?,
        progress_update_interval_ms: r.get(&fields::PROGRESS_UPDATE_INTERVAL_MS)?,
    };

    if !r.deprecated_env.is_empty() {
        let keys: Vec<String> = r.deprecated_env.iter().map(|k| k.to_string()).collect();
        tracing::warn!(
            keys = %keys.join(", "),
            "Deprecated environment keys in use; move these settings to config.yaml or a profile"
        );
        notices.push(ConfigNotice::DeprecatedEnv { keys });
    }

    let period = resolve_period(cli, profile, &query)?;
    let schedule = resolve_schedule(cli, profile)?;

    tracing::debug!(
        profile = profile.map(RawProfile::name),
        period = %period,
        format = %export.format,
        notices = notices.len(),
        "Configuration resolved"
    );

    Ok(AppConfig {
        secrets,
        query,
        export,
        xlsx,
        csv,
        excel_header,
        paths,
        display,
        period,
        schedule,
        profile: profile.map(|p| p.name().to_string()),
        notices,
    })
}
