//! Integration tests for the `dlite` CLI.

#![allow(clippy::unwrap_used)] // Tests can use unwrap for cleaner assertions

mod common;

use std::fs;

use assert_cmd::Command;
use common::{EXISTING_CONFIG, TestHome};
use predicates::prelude::*;

/// Helper to create a command for the dlite binary.
fn dlite_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("dlite"))
}

/// Test that the CLI shows help.
#[test]
fn test_help() {
    dlite_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dlite"))
        .stdout(predicate::str::contains("init"));
}

/// Test that the CLI shows version.
#[test]
fn test_version() {
    dlite_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Test that unrecognized commands fail.
#[test]
fn test_unknown_command() {
    dlite_cmd().arg("unknown-command").assert().failure().code(1);
}

#[test]
fn test_init_help() {
    dlite_cmd()
        .args(["init", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--debug"))
        .stdout(predicate::str::contains("sudo"));
}

#[test]
fn test_init_rejects_arguments() {
    dlite_cmd().args(["init", "--disk", "40"]).assert().failure();
}

/// Declining the guard must leave an existing install exactly as it was.
#[test]
fn test_init_declined_keeps_existing_install() {
    let home = TestHome::new();
    home.write_install_file("config.yaml", EXISTING_CONFIG.as_bytes());
    home.write_install_file("disk.qcow", b"QFI\xfbdisk");

    home.command()
        .arg("init")
        .write_stdin("n\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Continue? (y/n)"))
        .stderr(predicate::str::contains("Aborting initialization..."));

    assert_eq!(fs::read_to_string(home.config_file()).unwrap(), EXISTING_CONFIG);
    assert_eq!(fs::read(home.config_dir().join("disk.qcow")).unwrap(), b"QFI\xfbdisk");
    assert!(!home.path().join(".ssh").exists());
}

/// End of input at the confirmation is never taken as a yes.
#[test]
fn test_init_closed_stdin_aborts() {
    let home = TestHome::new();
    home.write_install_file("config.yaml", EXISTING_CONFIG.as_bytes());

    home.command()
        .arg("init")
        .write_stdin("")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Aborting initialization..."));

    assert_eq!(fs::read_to_string(home.config_file()).unwrap(), EXISTING_CONFIG);
}

/// A config file that cannot be parsed still counts as an install.
#[test]
fn test_init_corrupt_config_requires_confirmation() {
    let home = TestHome::new();
    home.write_install_file("config.yaml", b"hostname: [unterminated");

    home.command()
        .arg("init")
        .write_stdin("no\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Aborting initialization..."));

    assert_eq!(fs::read(home.config_file()).unwrap(), b"hostname: [unterminated");
}

#[test]
fn test_invalid_settings_file_fails() {
    let home = TestHome::new();
    home.write_settings("setup_program: [oops");

    home.command()
        .arg("init")
        .write_stdin("")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));

    assert!(!home.config_dir().exists());
}

#[test]
fn test_debug_env_enables_logging() {
    let home = TestHome::new();
    home.write_install_file("config.yaml", EXISTING_CONFIG.as_bytes());

    home.command()
        .env("DLITE_DEBUG", "1")
        .arg("init")
        .write_stdin("n\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Found existing installation"));
}
