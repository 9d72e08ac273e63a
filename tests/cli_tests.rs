mod support;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

use support::config::{write_temp_config, OFFLINE_CONFIG};

const ENV_OVERRIDES: &[&str] = &[
    "TELEGRAM_BOT_TOKEN",
    "ALLOWED_USER_IDS",
    "ADMIN_USER_IDS",
    "MAX_MEMORY_MB",
    "MEMORY_CHECK_INTERVAL",
    "MONITOR_INTERVAL",
    "ODDS_CHANGE_THRESHOLD",
];

fn oddswatch() -> Command {
    let mut cmd = Command::cargo_bin("oddswatch").expect("binary is built");
    for key in ENV_OVERRIDES {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn help_lists_subcommands() {
    oddswatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("odds"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn check_config_accepts_valid_file() {
    let path = write_temp_config(OFFLINE_CONFIG);
    let assert = oddswatch()
        .args(["check", "config", "--config"])
        .arg(&path)
        .assert();
    let _ = fs::remove_file(&path);

    assert
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn check_config_json_reports_effective_values() {
    let path = write_temp_config(OFFLINE_CONFIG);
    let assert = oddswatch()
        .args(["--json", "check", "config", "--config"])
        .arg(&path)
        .env("MONITOR_INTERVAL", "12")
        .assert();
    let _ = fs::remove_file(&path);

    assert
        .success()
        .stdout(predicate::str::contains("\"poll_interval_secs\":12"))
        .stdout(predicate::str::contains("\"valid\":true"));
}

#[test]
fn invalid_config_exits_nonzero() {
    let path = write_temp_config("[monitor]\nmax_sessions = 0\n");
    let assert = oddswatch()
        .args(["check", "config", "--config"])
        .arg(&path)
        .assert();
    let _ = fs::remove_file(&path);

    assert
        .failure()
        .stderr(predicate::str::contains("max_sessions"));
}

#[test]
fn invalid_env_override_exits_nonzero() {
    let path = write_temp_config(OFFLINE_CONFIG);
    let assert = oddswatch()
        .args(["check", "config", "--config"])
        .arg(&path)
        .env("ODDS_CHANGE_THRESHOLD", "lots")
        .assert();
    let _ = fs::remove_file(&path);

    assert
        .failure()
        .stderr(predicate::str::contains("ODDS_CHANGE_THRESHOLD"));
}
