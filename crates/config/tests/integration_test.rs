//! Integration tests for configuration loading and credential storage.
//!
//! These tests drive the public API the way the `olap-export` binary does:
//! example profiles on disk, a settings file, CLI overrides, and the
//! credential vault.

use std::fs;

use olap_config::credentials::IdentityFacts;
use olap_config::{
    AuthMethod, CliOverrides, ConfigLoader, CredentialRecord, CredentialVault, EnvMap,
    ExportFormat, MachineFingerprint, ProfileStore,
};
use olap_period::{AutoPeriod, FixedClock, PeriodCalculator, PeriodSpec, YearWeek};
use secrecy::{ExposeSecret, SecretString};
use serde_yaml::Mapping;
use tempfile::TempDir;

fn yw(year: i32, week: u32) -> YearWeek {
    YearWeek::new(year, week).unwrap()
}

#[test]
fn test_example_profiles_resolve_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let profiles_dir = temp_dir.path().join("profiles");
    let store = ProfileStore::new(&profiles_dir);

    let written = store.write_examples().unwrap();
    assert_eq!(written.len(), 3);
    // Second run leaves existing files alone.
    assert!(store.write_examples().unwrap().is_empty());

    let config = ConfigLoader::new()
        .with_settings_path(temp_dir.path().join("config.yaml"))
        .with_profiles_dir(profiles_dir.clone())
        .with_profile_name("monthly_report".to_string())
        .build()
        .unwrap();

    assert_eq!(config.export().format, ExportFormat::Both);
    assert_eq!(*config.period(), PeriodSpec::Auto(AutoPeriod::CurrentMonth));
    assert!(config.schedule().is_some_and(|s| s.cron.is_some()));

    // 2026-02-11 is a Wednesday; February 2026 has Thursdays in weeks 6..=9.
    let calc = PeriodCalculator::new(FixedClock(
        chrono::NaiveDate::from_ymd_opt(2026, 2, 11).unwrap(),
    ));
    let weeks = calc.generate_year_week_pairs(config.period()).unwrap();
    assert_eq!(weeks, vec![yw(2026, 6), yw(2026, 7), yw(2026, 8), yw(2026, 9)]);
}

#[test]
fn test_profile_store_save_list_delete() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProfileStore::new(temp_dir.path());

    let mut mapping: Mapping = serde_yaml::from_str(
        "description: Ad hoc\nexport:\n  format: csv\nperiod:\n  type: manual\n  start: \"2025-50\"\n  end: \"2026-02\"\n",
    )
    .unwrap();
    mapping.insert("query".into(), serde_yaml::from_str("timeout: 90").unwrap());
    store.save("adhoc", mapping).unwrap();

    assert_eq!(store.list().unwrap(), vec!["adhoc".to_string()]);
    let summaries = store.summaries().unwrap();
    assert_eq!(summaries[0].format.as_deref(), Some("csv"));
    assert_eq!(summaries[0].period, "2025-50:2026-02");

    let config = ConfigLoader::new()
        .with_settings_path(temp_dir.path().join("config.yaml"))
        .with_profiles_dir(temp_dir.path().to_path_buf())
        .with_profile_name("adhoc".to_string())
        .with_cli(CliOverrides::new().with("export.format", "xlsx"))
        .build()
        .unwrap();
    assert_eq!(config.query().timeout, 90);
    assert_eq!(config.export().format, ExportFormat::Xlsx);

    store.delete("adhoc").unwrap();
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_login_credentials_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let env = EnvMap::from_pairs([
        ("OLAP_AUTH_METHOD", "LOGIN"),
        (
            "OLAP_CREDENTIALS_FILE",
            temp_dir.path().join("creds").to_str().unwrap(),
        ),
    ]);
    let config = ConfigLoader::new()
        .with_settings_path(temp_dir.path().join("config.yaml"))
        .with_env(env)
        .build()
        .unwrap();
    assert_eq!(config.secrets().auth_method, AuthMethod::Login);
    assert!(config.secrets().auth_method.requires_password());

    let fingerprint = MachineFingerprint::from_facts(&IdentityFacts {
        hostname: "WS-01".to_string(),
        account: "analyst".to_string(),
        volume_id: "5E2A-91F0".to_string(),
    });
    let vault = CredentialVault::new(fingerprint);
    let path = &config.secrets().credentials_file;

    vault
        .save(
            path,
            &CredentialRecord::new("CORP", "analyst", SecretString::new("pw".to_string().into())),
        )
        .unwrap();
    assert!(fs::metadata(path).is_ok());

    let loaded = vault.load(path).unwrap();
    assert_eq!(loaded.username, "analyst");
    assert_eq!(loaded.password.expose_secret(), "pw");

    assert!(CredentialVault::delete(path).unwrap());
    assert!(vault.load(path).unwrap_err().is_missing());
}
