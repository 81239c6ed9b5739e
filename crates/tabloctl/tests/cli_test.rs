//! Integration tests for the `tabloctl` binary.
//!
//! These validate argument parsing, help output, and error handling —
//! all without requiring a live recorder.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `tabloctl` binary with env isolation.
///
/// Clears all `TABLO_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn tabloctl_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("tabloctl");
    cmd.env("HOME", "/tmp/tabloctl-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/tabloctl-test-nonexistent")
        .env_remove("TABLO_PROFILE")
        .env_remove("TABLO_OUTPUT")
        .env_remove("TABLO_TIMEOUT")
        .env_remove("TABLO_PASSWORD")
        .env_remove("TABLO_ROKU");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = tabloctl_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    tabloctl_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Tablo")
            .and(predicate::str::contains("tune"))
            .and(predicate::str::contains("channels"))
            .and(predicate::str::contains("status")),
    );
}

#[test]
fn test_version_flag() {
    tabloctl_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tabloctl"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = tabloctl_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_tune_requires_a_channel_selector() {
    // `--id`/`--number` form a required arg group, so this is a usage
    // error caught by clap before any config or network access.
    let output = tabloctl_cmd().arg("tune").output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected usage exit code");
    let text = combined_output(&output);
    assert!(
        text.contains("--id") || text.contains("--number") || text.contains("required"),
        "Expected usage error about the channel selector:\n{text}"
    );
}

#[test]
fn test_tune_no_config() {
    tabloctl_cmd()
        .args(["tune", "--number", "2.1"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("login")
                .or(predicate::str::contains("config"))
                .or(predicate::str::contains("recorder")),
        );
}

#[test]
fn test_channels_no_config() {
    tabloctl_cmd().arg("channels").assert().failure().stderr(
        predicate::str::contains("login")
            .or(predicate::str::contains("config"))
            .or(predicate::str::contains("recorder")),
    );
}

#[test]
fn test_invalid_output_format() {
    let output = tabloctl_cmd()
        .args(["--output", "invalid", "channels"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Config commands (no recorder needed) ────────────────────────────

#[test]
fn test_config_show_no_config() {
    // `config show` uses load_config_or_default() so it succeeds even
    // when no config file exists — it just renders the default config.
    tabloctl_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_profiles_empty() {
    tabloctl_cmd()
        .args(["config", "profiles"])
        .assert()
        .success();
}

#[test]
fn test_config_path_prints_path() {
    tabloctl_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_use_unknown_profile() {
    let output = tabloctl_cmd()
        .args(["config", "use", "nonexistent"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4), "Expected not-found exit code");
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_tune_help() {
    tabloctl_cmd().args(["tune", "--help"]).assert().success().stdout(
        predicate::str::contains("--id")
            .and(predicate::str::contains("--number"))
            .and(predicate::str::contains("--roku")),
    );
}

#[test]
fn test_status_help() {
    // The interval default comes from the core monitor's probe spacing.
    tabloctl_cmd()
        .args(["status", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--watch")
                .and(predicate::str::contains("--interval"))
                .and(predicate::str::contains("[default: 30]")),
        );
}

#[test]
fn test_config_subcommands_exist() {
    tabloctl_cmd().args(["config", "--help"]).assert().success().stdout(
        predicate::str::contains("show")
            .and(predicate::str::contains("profiles"))
            .and(predicate::str::contains("set-password")),
    );
}
