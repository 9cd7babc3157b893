//! Integration tests for the CLI skeleton: help, version and global flags.

#![allow(clippy::expect_used)]

use predicates::prelude::*;

use crate::support::stackcraft;

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    stackcraft()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("load-balanced container service"));
}

#[test]
fn test_cli_help_lists_every_command() {
    let assert = stackcraft().arg("--help").assert().success();
    let out = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    for command in [
        "synth",
        "validate",
        "grants",
        "deploy",
        "destroy",
        "purge-retained",
        "config",
        "version",
    ] {
        assert!(out.contains(command), "help is missing {command}:\n{out}");
    }
}

#[test]
fn test_cli_version_flag_shows_version() {
    stackcraft()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stackcraft"));
}

#[test]
fn test_version_command_shows_version() {
    stackcraft()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stackcraft 0.1.0"));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    stackcraft()
        .args(["version", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""version": "0.1.0""#));
}

#[test]
fn test_unknown_command_fails() {
    stackcraft()
        .arg("provision")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_deploy_help_shows_override_flags() {
    stackcraft()
        .args(["deploy", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--certificate"))
        .stdout(predicate::str::contains("--image-tag"))
        .stdout(predicate::str::contains("--desired-count"));
}

// --- NO_COLOR handling ---

#[test]
fn test_no_color_accepts_conventional_values() {
    for value in ["1", "yes", "true", "anything"] {
        stackcraft()
            .env("NO_COLOR", value)
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains("stackcraft 0.1.0"));
    }
}

#[test]
fn test_no_color_output_has_no_ansi_codes() {
    stackcraft()
        .env("NO_COLOR", "1")
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn test_no_color_flag_and_env_together() {
    stackcraft()
        .env("NO_COLOR", "1")
        .args(["--no-color", "version"])
        .assert()
        .success();
}
