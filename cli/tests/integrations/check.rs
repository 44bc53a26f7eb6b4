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
    {"key": "city", "label": "City", "type": "text"}
  ],
  "conditions": [],
  "formula": ""
}"#;

#[test]
fn test_check_prints_canonical_text() {
    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("check")
        .arg("if booking_hours >= 4 then booking_hours * 10 else booking_hours * 8");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with(
            "IF booking_hours >= 4 THEN booking_hours * 10 ELSE booking_hours * 8",
        ))
        .stdout(predicate::str::contains("Clause 1"));
}

#[test]
fn test_check_with_definition_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("rule.json");
    fs::write(&path, DEFINITION).unwrap();

    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("check")
        .arg("IF city = 'Cebu' AND guest_count > 2 THEN 100")
        .arg("--definition")
        .arg(&path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "IF city = 'Cebu' AND guest_count > 2 THEN 100",
        ));
}

#[test]
fn test_check_unknown_reference() {
    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("check").arg("IF price > 4 THEN 1");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("price"))
        .stderr(predicate::str::contains("Semantic error"));
}

#[test]
fn test_check_contradiction() {
    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("check")
        .arg("IF booking_hours > 10 AND booking_hours < 5 THEN 1");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Consistency error"));
}

#[test]
fn test_check_missing_then() {
    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("check").arg("IF booking_hours > 4");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Syntax error: Missing THEN"));
}

#[test]
fn test_check_missing_definition_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("check")
        .arg("booking_hours * 2")
        .arg("-d")
        .arg(temp_dir.path().join("absent.json"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read definition"));
}

#[test]
fn test_check_rejects_definition_without_reserved_variables() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("rule.json");
    fs::write(
        &path,
        r#"{"variables": [{"key": "city", "label": "City", "type": "text"}], "conditions": [], "formula": ""}"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("check")
        .arg("booking_hours * 2")
        .arg("-d")
        .arg(&path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("booking_hours"));
}
