//! End-to-end tests for the `careen completions` and `careen version`
//! commands.

mod common;
use common::prelude::*;

#[test]
fn test_completions_help_lists_shells() {
    let mut cmd = cargo_bin_cmd!("careen");
    cmd.arg("completions")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generate shell completion scripts"))
        .stdout(predicate::str::contains("bash"))
        .stdout(predicate::str::contains("fish"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = cargo_bin_cmd!("careen");
    cmd.arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_careen()"))
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_completions_zsh() {
    let mut cmd = cargo_bin_cmd!("careen");
    cmd.arg("completions")
        .arg("zsh")
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef careen"));
}

#[test]
fn test_completions_unknown_shell() {
    let mut cmd = cargo_bin_cmd!("careen");
    cmd.arg("completions").arg("tcsh").assert().code(2);
}

#[test]
fn test_version_command_reports_platform() {
    let mut cmd = cargo_bin_cmd!("careen");
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "careen {}",
            env!("CARGO_PKG_VERSION")
        )))
        .stdout(predicate::str::contains("build: "))
        .stdout(predicate::str::contains(std::env::consts::OS));
}
