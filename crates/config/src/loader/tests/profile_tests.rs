//! Builder tests against profiles and settings files on disk.

use std::fs;
use std::path::Path;

use olap_period::{AutoPeriod, PeriodSpec};
use tempfile::TempDir;

use crate::loader::builder::ConfigLoader;
use crate::loader::cli::CliOverrides;
use crate::loader::error::ConfigError;
use crate::persistence::ProfileError;
use crate::types::{ConfigNotice, ExportFormat};

/// Writes `config.yaml` and `profiles/weekly.yaml` under `dir`.
pub fn create_test_layout(dir: &Path) {
    fs::write(
        dir.join("config.yaml"),
        "query:\n  timeout: 30\nexport:\n  format: xlsx\ncsv:\n  delimiter: \",\"\n",
    )
    .unwrap();
    let profiles = dir.join("profiles");
    fs::create_dir_all(&profiles).unwrap();
    fs::write(
        profiles.join("weekly.yaml"),
        "description: Weekly sales\nquery:\n  timeout: 3\nexport:\n  format: both\nperiod:\n  type: auto\n  auto_type: last-weeks\n  auto_value: 2\n",
    )
    .unwrap();
}

fn loader(dir: &Path) -> ConfigLoader {
    ConfigLoader::new()
        .with_settings_path(dir.join("config.yaml"))
        .with_profiles_dir(dir.join("profiles"))
}

#[test]
fn test_build_with_profile_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    create_test_layout(temp_dir.path());

    let config = loader(temp_dir.path())
        .with_profile_name("weekly".to_string())
        .build()
        .unwrap();

    assert_eq!(config.profile(), Some("weekly"));
    assert_eq!(config.query().timeout, 3);
    assert_eq!(config.export().format, ExportFormat::Both);
    assert_eq!(config.csv().delimiter, ',');
    assert_eq!(*config.period(), PeriodSpec::Auto(AutoPeriod::LastWeeks(2)));
}

#[test]
fn test_build_without_profile_uses_settings_file() {
    let temp_dir = TempDir::new().unwrap();
    create_test_layout(temp_dir.path());

    let config = loader(temp_dir.path()).build().unwrap();
    assert_eq!(config.query().timeout, 30);
    assert_eq!(config.export().format, ExportFormat::Xlsx);
    assert_eq!(*config.period(), PeriodSpec::CurrentWeek);
}

#[test]
fn test_cli_overrides_disk_profile() {
    let temp_dir = TempDir::new().unwrap();
    create_test_layout(temp_dir.path());

    let config = loader(temp_dir.path())
        .with_profile_name("weekly".to_string())
        .with_cli(CliOverrides::new().with("query.timeout", "10"))
        .build()
        .unwrap();
    assert_eq!(config.query().timeout, 10);
}

#[test]
fn test_missing_profile_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    create_test_layout(temp_dir.path());

    let err = loader(temp_dir.path())
        .with_profile_name("nope".to_string())
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Profile(ProfileError::NotFound { .. })
    ));
}

#[test]
fn test_missing_settings_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::new()
        .with_settings_path(temp_dir.path().join("absent.yaml"))
        .build()
        .unwrap();
    assert_eq!(config.query().timeout, 30);
}

#[test]
fn test_malformed_settings_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    fs::write(&path, "query: [unclosed\n").unwrap();

    let err = ConfigLoader::new()
        .with_settings_path(path)
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::SettingsParse { .. }));
}

#[test]
fn test_legacy_profile_keys_are_migrated_and_reported() {
    let temp_dir = TempDir::new().unwrap();
    create_test_layout(temp_dir.path());
    fs::write(
        temp_dir.path().join("profiles").join("legacy.yaml"),
        "connection:\n  timeout: 12\nfilter:\n  fg1_name: Toys\n",
    )
    .unwrap();

    let config = loader(temp_dir.path())
        .with_profile_name("legacy".to_string())
        .build()
        .unwrap();

    assert_eq!(config.query().timeout, 12);
    assert_eq!(config.query().filter_fg1_name.as_deref(), Some("Toys"));
    let migrated: Vec<_> = config
        .notices()
        .iter()
        .filter_map(|n| match n {
            ConfigNotice::DeprecatedProfileKey { from, to, .. } => Some((from.as_str(), to.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(
        migrated,
        vec![
            ("filter.fg1_name", "query.filter_fg1_name"),
            ("connection.timeout", "query.timeout"),
        ]
    );
}
