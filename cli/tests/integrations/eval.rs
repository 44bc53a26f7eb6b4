use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_eval_constant_expression() {
    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("eval").arg("2 + 3 * 4");

    cmd.assert().success().stdout("14\n");
}

#[test]
fn test_eval_with_variables() {
    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("eval")
        .arg("booking_hours * rate")
        .arg("booking_hours=3")
        .arg("rate=12.5");

    cmd.assert().success().stdout("37.5\n");
}

#[test]
fn test_eval_division_by_zero() {
    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("eval").arg("10 / (5 - 5)");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Division by zero"));
}

#[test]
fn test_eval_rejects_malformed_value() {
    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("eval").arg("x * 2").arg("x");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Expected key=number"));
}

#[test]
fn test_eval_respects_max_depth() {
    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("--max-depth").arg("2").arg("eval").arg("((((1))))");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Resource limit exceeded"));
}

#[test]
fn test_eval_rejects_non_finite_values() {
    let mut cmd = Command::cargo_bin("pricerule").unwrap();
    cmd.arg("eval").arg("x").arg("x=NaN");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid number: x"));
}
