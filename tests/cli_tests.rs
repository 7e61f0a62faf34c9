use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn pmd() -> Command {
    Command::cargo_bin("pmd").unwrap()
}

fn example_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.toml.example")
}

#[test]
fn help_lists_operator_commands() {
    pmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("once"))
        .stdout(predicate::str::contains("theme"))
        .stdout(predicate::str::contains("settings"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn theme_prints_the_grouping_key_as_json() {
    pmd()
        .args([
            "--json",
            "theme",
            "Will Bitcoin be between $95,000 and $100,000 on January 5?",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("bitcoin|jan-5|price-band"))
        .stdout(predicate::str::contains("price_band"));
}

#[test]
fn check_accepts_the_example_config() {
    pmd()
        .arg("--config")
        .arg(example_config())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
}

#[test]
fn check_rejects_a_broken_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[scheduler]\ninterval_seconds = 0\n").unwrap();

    pmd()
        .arg("--config")
        .arg(&path)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("interval_seconds"));
}

#[test]
fn settings_resolves_a_configured_user() {
    pmd()
        .arg("--config")
        .arg(example_config())
        .args(["--json", "settings", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"plan_name\":\"pro\""))
        .stdout(predicate::str::contains("\"copilot_enabled\":true"));
}

#[test]
fn settings_rejects_an_unknown_user() {
    pmd()
        .arg("--config")
        .arg(example_config())
        .args(["settings", "carol"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown user: carol"));
}
