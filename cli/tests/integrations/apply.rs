use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const DEFINITION: &str = r#"{
  "variables": [
    {"key": "booking_hours", "label": "Booking hours", "type": "number"},
    {"key": "booking_days", "label": "Booking days", "type": "number"},
    {"key": "guest_count", "label": "Guest count", "type": "number"},
    {"key": "booking_date", "label": "Booking date", "type": "date"},
    {"key": "booking_start_time", "label": "Booking start time", "type": "time"},
    {"key": "booking_end_time", "label": "Booking end time", "type": "time"},
    {"key": "rate", "label": "Rate", "type": "number"}
  ],
  "conditions": [],
  "formula": ""
}"#;

fn definition_file() -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("rule.json");
    fs::write(&path, DEFINITION).unwrap();
    (temp_dir, path)
}

#[test]
fn test_apply_prints_json() {
    let (_dir, path) = definition_file();

    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("apply")
        .arg("IF rate > 10 THEN booking_hours * rate")
        .arg("-d")
        .arg(&path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""comparator": ">""#))
        .stdout(predicate::str::contains(r#""formula": "booking_hours * rate""#));

    // Without --write the file is left alone
    assert_eq!(fs::read_to_string(&path).unwrap(), DEFINITION);
}

#[test]
fn test_apply_write_then_format() {
    let (_dir, path) = definition_file();

    let mut apply = Command::cargo_bin("pricerule").unwrap();
    apply
        .arg("apply")
        .arg("if rate >= 2 or booking_hours < 1 then rate else 0")
        .arg("-d")
        .arg(&path)
        .arg("--write");
    apply
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated"));

    let mut format = Command::cargo_bin("pricerule").unwrap();
    format.arg("format").arg("-d").arg(&path);
    format
        .assert()
        .success()
        .stdout("IF rate >= 2 OR booking_hours < 1 THEN rate ELSE 0\n");
}

#[test]
fn test_apply_failure_keeps_file() {
    let (_dir, path) = definition_file();

    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("apply")
        .arg("IF rate > 1 AND rate > 1 THEN 1")
        .arg("-d")
        .arg(&path)
        .arg("--write");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate condition"));
    assert_eq!(fs::read_to_string(&path).unwrap(), DEFINITION);
}

#[test]
fn test_format_rejects_invalid_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("format").arg("-d").arg(&path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Serialization error"));
}
