//! Integration tests for profile management and profile-driven runs.

mod common;

use common::{json_stdout, olap_cmd};
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_missing_profile_exits_4() {
    let dir = TempDir::new().unwrap();
    olap_cmd(&dir)
        .args(["--profile", "nope"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Profile 'nope' not found"));
}

#[test]
fn test_invalid_profile_name_exits_5() {
    let dir = TempDir::new().unwrap();
    olap_cmd(&dir)
        .args(["--profile", "../escape"])
        .assert()
        .code(5);
}

#[test]
fn test_init_list_show_delete() {
    let dir = TempDir::new().unwrap();

    olap_cmd(&dir)
        .args(["profiles", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created profile 'weekly_sales'"));
    assert!(dir.path().join("profiles/monthly_report.yaml").is_file());

    olap_cmd(&dir)
        .args(["profiles", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already present"));

    let list = json_stdout(olap_cmd(&dir).args(["-o", "json", "profiles", "list"]));
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["monthly_report", "quarterly_analysis", "weekly_sales"]);

    olap_cmd(&dir)
        .args(["profiles", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NAME"))
        .stdout(predicate::str::contains("last-quarter"));

    olap_cmd(&dir)
        .args(["profiles", "show", "monthly_report.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("auto_type: current-month"));

    olap_cmd(&dir)
        .args(["profiles", "delete", "monthly_report", "--yes"])
        .assert()
        .success();
    assert!(!dir.path().join("profiles/monthly_report.yaml").exists());

    olap_cmd(&dir)
        .args(["profiles", "delete", "monthly_report", "--yes"])
        .assert()
        .code(4);
}

#[test]
fn test_delete_without_yes_refuses_without_terminal() {
    let dir = TempDir::new().unwrap();
    olap_cmd(&dir).args(["profiles", "init"]).assert().success();

    olap_cmd(&dir)
        .args(["profiles", "delete", "weekly_sales"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
    assert!(dir.path().join("profiles/weekly_sales.yaml").is_file());
}

#[test]
fn test_example_profile_drives_the_plan() {
    let dir = TempDir::new().unwrap();
    olap_cmd(&dir).args(["profiles", "init"]).assert().success();

    let json = json_stdout(olap_cmd(&dir).args([
        "--profile",
        "monthly_report",
        "--as-of",
        "2026-02-11",
        "-o",
        "json",
    ]));
    assert_eq!(json["period"], "current-month");
    assert_eq!(
        json["weeks"],
        serde_json::json!(["2026-06", "2026-07", "2026-08", "2026-09"])
    );
    assert_eq!(json["format"], "both");
    assert_eq!(json["compress"], "zip");

    // A CLI period beats the profile's.
    let json = json_stdout(olap_cmd(&dir).args([
        "--profile",
        "monthly_report",
        "--as-of",
        "2026-02-11",
        "--last-weeks",
        "1",
        "-o",
        "json",
    ]));
    assert_eq!(json["weeks"], serde_json::json!(["2026-07"]));
}

#[test]
fn test_show_reports_migrated_keys() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("profiles")).unwrap();
    std::fs::write(
        dir.path().join("profiles/old.yaml"),
        "filter:\n  fg1_name: Toys\n",
    )
    .unwrap();

    let output = olap_cmd(&dir)
        .args(["profiles", "show", "old"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("filter_fg1_name: Toys"), "{stdout}");
    assert!(stderr.contains("Deprecated profile key"), "{stderr}");
    assert_eq!(stderr.matches("filter.fg1_name").count(), 1, "{stderr}");
}
