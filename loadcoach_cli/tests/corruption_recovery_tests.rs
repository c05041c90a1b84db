//! Corruption recovery tests for the loadcoach binary.
//!
//! These tests verify the system can handle:
//! - Corrupted profile files
//! - Corrupted or partially written WAL lines, including invalid UTF-8
//! - Sets with missing or zero weight/reps
//! - Malformed CSV archive rows

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn cli(data_dir: &Path, config: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("loadcoach"));
    cmd.arg("--data-dir").arg(data_dir).arg("--config").arg(config);
    cmd
}

fn setup_test_dir() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = temp_dir.path().join("data");
    let config = temp_dir.path().join("config.toml");
    fs::write(&config, "").expect("Failed to write config");
    fs::create_dir_all(data_dir.join("wal")).unwrap();
    (temp_dir, data_dir, config)
}

fn suggest_json(data_dir: &Path, config: &Path, exercise: &str) -> Value {
    let output = cli(data_dir, config)
        .args(["suggest", "-e", exercise, "--json"])
        .output()
        .expect("Failed to run suggest");
    assert!(output.status.success(), "suggest failed: {:?}", output);
    serde_json::from_slice(&output.stdout).expect("suggest output is not JSON")
}

#[test]
fn test_corrupted_profile_file() {
    let (_temp_dir, data_dir, config) = setup_test_dir();

    fs::write(data_dir.join("profile.json"), "{ invalid json }}}}").unwrap();

    cli(&data_dir, &config)
        .arg("profile")
        .assert()
        .success()
        .stdout(predicate::str::contains("not set"));

    // Cold start falls back to the default body weight: 0.7 * 70 = 49 -> 50
    let report = suggest_json(&data_dir, &config, "Squat");
    assert_eq!(report["suggested_load"].as_f64(), Some(50.0));

    // Writing a new weight replaces the corrupt file
    cli(&data_dir, &config)
        .args(["profile", "--body-weight", "80"])
        .assert()
        .success();
    let contents = fs::read_to_string(data_dir.join("profile.json")).unwrap();
    serde_json::from_str::<Value>(&contents).expect("profile still corrupt");
}

#[test]
fn test_corrupted_wal_lines_ignored() {
    let (_temp_dir, data_dir, config) = setup_test_dir();

    fs::write(
        data_dir.join("wal/sets.wal"),
        "{ invalid json }\n{ more invalid }\n",
    )
    .unwrap();

    let report = suggest_json(&data_dir, &config, "Squat");
    assert_eq!(report["source"], "cold_start");
}

#[test]
fn test_partial_wal_line() {
    let (_temp_dir, data_dir, config) = setup_test_dir();

    cli(&data_dir, &config)
        .args(["log", "-e", "Bench Press", "-w", "80", "-r", "10", "--rir", "3"])
        .assert()
        .success();

    // Simulate a crash halfway through a write
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(data_dir.join("wal/sets.wal"))
        .unwrap();
    write!(file, r#"{{"id":"00000000-0000-0000-0000-000000000001","exercise":"Bench"#).unwrap();
    drop(file);

    let report = suggest_json(&data_dir, &config, "Bench Press");
    assert_eq!(report["suggested_load"].as_f64(), Some(82.5));

    // A set logged after the partial line is kept intact
    cli(&data_dir, &config)
        .args(["log", "-e", "Bench Press", "-w", "82.5", "-r", "8"])
        .assert()
        .success();

    let report = suggest_json(&data_dir, &config, "Bench Press");
    assert_eq!(report["samples"].as_array().unwrap().len(), 2);
    assert_eq!(report["samples"][0]["weight"].as_f64(), Some(82.5));
}

#[test]
fn test_torn_multibyte_wal_line() {
    let (_temp_dir, data_dir, config) = setup_test_dir();
    let exercise = "Extensión cuádriceps";

    cli(&data_dir, &config)
        .args(["log", "-e", exercise, "-w", "40", "-r", "10", "--rir", "3"])
        .assert()
        .success();

    // Crash in the middle of the two-byte 'ó'
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(data_dir.join("wal/sets.wal"))
        .unwrap();
    file.write_all(b"{\"id\":\"00000000-0000-0000-0000-000000000001\",\"exercise\":\"Extensi\xC3")
        .unwrap();
    drop(file);

    cli(&data_dir, &config)
        .args(["log", "-e", exercise, "-w", "40", "-r", "10"])
        .assert()
        .success();

    // 40 * (1 + 10/30) * 0.75 = 40, easy set * 1.025 = 41 -> 40
    let report = suggest_json(&data_dir, &config, exercise);
    assert_eq!(report["source"], "history");
    assert_eq!(report["suggested_load"].as_f64(), Some(40.0));
    assert_eq!(report["samples"].as_array().unwrap().len(), 2);

    cli(&data_dir, &config)
        .args(["history", "-e", exercise])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 most recent sets"));

    cli(&data_dir, &config)
        .arg("rollup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 2 sets to CSV"));
}

#[test]
fn test_unusable_sets_are_excluded() {
    let (_temp_dir, data_dir, config) = setup_test_dir();

    // A newer zero-weight set and a set missing its reps must not count
    let mut file = fs::File::create(data_dir.join("wal/sets.wal")).unwrap();
    writeln!(
        file,
        r#"{{"id":"00000000-0000-0000-0000-000000000001","exercise":"Squat","weight":50.0,"reps":8,"recorded_at":"2024-01-10T10:00:00Z"}}"#
    )
    .unwrap();
    writeln!(
        file,
        r#"{{"id":"00000000-0000-0000-0000-000000000002","exercise":"Squat","weight":0.0,"reps":10,"recorded_at":"2024-01-11T10:00:00Z"}}"#
    )
    .unwrap();
    writeln!(
        file,
        r#"{{"id":"00000000-0000-0000-0000-000000000003","exercise":"Squat","weight":90.0,"recorded_at":"2024-01-12T10:00:00Z"}}"#
    )
    .unwrap();
    drop(file);

    // Only 50 x 8 counts: 50 * (1 + 8/30) * 0.75 = 47.5
    let report = suggest_json(&data_dir, &config, "squat");
    assert_eq!(report["source"], "history");
    assert_eq!(report["suggested_load"].as_f64(), Some(47.5));
    assert_eq!(report["samples"].as_array().unwrap().len(), 1);
}

#[test]
fn test_all_sets_unusable_falls_back_to_cold_start() {
    let (_temp_dir, data_dir, config) = setup_test_dir();

    fs::write(
        data_dir.join("wal/sets.wal"),
        concat!(
            r#"{"id":"00000000-0000-0000-0000-000000000001","exercise":"Sentadilla","weight":0.0,"reps":10,"recorded_at":"2024-01-10T10:00:00Z","body_weight":80.0}"#,
            "\n"
        ),
    )
    .unwrap();

    // Body weight comes from the logged set: 0.7 * 80 = 56 -> 55
    let report = suggest_json(&data_dir, &config, "Sentadilla");
    assert_eq!(report["source"], "cold_start");
    assert_eq!(report["suggested_load"].as_f64(), Some(55.0));
}

#[test]
fn test_malformed_csv_rows_skipped() {
    let (_temp_dir, data_dir, config) = setup_test_dir();

    cli(&data_dir, &config)
        .args(["log", "-e", "Deadlift", "-w", "140", "-r", "5"])
        .assert()
        .success();
    cli(&data_dir, &config).arg("rollup").assert().success();

    let mut csv = fs::OpenOptions::new()
        .append(true)
        .open(data_dir.join("sets.csv"))
        .unwrap();
    writeln!(csv, "not-a-uuid,Deadlift,150,5,2,yesterday,,").unwrap();
    writeln!(csv, "garbage").unwrap();
    drop(csv);

    cli(&data_dir, &config)
        .args(["history", "-e", "Deadlift"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 most recent sets"));
}
