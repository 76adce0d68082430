//! End-to-end tests for the cabal-outdated CLI
//!
//! These tests verify:
//! - Text and simple output on stdout
//! - Quiet mode and exit codes
//! - Fatal errors are reported on stderr with a failure status

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const INDEX: &str = r#"{
  "packages": {
    "base": ["4.18.2.1", "4.19.1.0"],
    "text": ["2.0.2", "2.1.1"],
    "aeson": ["2.1.2.1", "2.2.3.0"],
    "hspec": ["2.11.9"]
  }
}"#;

/// Create a project with a legacy freeze file and a package index
fn create_test_project() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    fs::write(temp_dir.path().join("index.json"), INDEX).unwrap();
    fs::write(
        temp_dir.path().join("cabal.config"),
        "constraints: any.base ==4.18.2.1,\n             any.text ==2.1.1,\n             any.aeson ==2.1.2.1\n",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("demo.cabal"),
        "cabal-version: 3.0\nname: demo\nversion: 0.1\n\nlibrary\n  build-depends: base >=4.18 && <4.20, text ==2.0.2\n\ntest-suite unit\n  build-depends: demo, hspec\n",
    )
    .unwrap();
    temp_dir
}

fn cabal_outdated(project: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cabal-outdated").unwrap();
    cmd.arg("--index")
        .arg(project.path().join("index.json"))
        .arg(project.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_description_text_output() {
    let project = create_test_project();
    cabal_outdated(&project)
        .assert()
        .success()
        .stdout("Outdated dependencies:\ntext ==2.0.2 (latest: 2.1.1)\n");
}

#[test]
fn test_freeze_file_simple_output() {
    let project = create_test_project();
    cabal_outdated(&project)
        .args(["--freeze-file", "--simple-output"])
        .assert()
        .success()
        .stdout("base\naeson\n");
}

#[test]
fn test_ignore_all_outdated() {
    let project = create_test_project();
    cabal_outdated(&project)
        .args(["--freeze-file", "--ignore", "base,aeson", "--exit-code"])
        .assert()
        .success()
        .stdout("All dependencies are up to date.\n");
}

#[test]
fn test_minor_flag_without_value() {
    let project = create_test_project();
    cabal_outdated(&project)
        .args(["--freeze-file", "--minor", "--exit-code"])
        .assert()
        .success()
        .stdout("All dependencies are up to date.\n");
}

#[test]
fn test_exit_code_with_findings() {
    let project = create_test_project();
    cabal_outdated(&project)
        .args(["--freeze-file", "--exit-code"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("base ==4.18.2.1 (latest: 4.19.1.0)"));
}

#[test]
fn test_quiet_implies_exit_code() {
    let project = create_test_project();
    cabal_outdated(&project)
        .args(["--freeze-file", "--quiet"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_quiet_with_no_exit_code() {
    let project = create_test_project();
    cabal_outdated(&project)
        .args(["--freeze-file", "-q", "--no-exit-code"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_missing_freeze_file_is_fatal() {
    let project = create_test_project();
    cabal_outdated(&project)
        .arg("--v2-freeze-file")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::starts_with("Error: could not find cabal.project"));
}

#[test]
fn test_missing_index_is_fatal() {
    let project = create_test_project();
    Command::cargo_bin("cabal-outdated")
        .unwrap()
        .arg("--index")
        .arg(project.path().join("missing.json"))
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read package index"));
}

#[test]
fn test_invalid_package_name_is_rejected() {
    let project = create_test_project();
    cabal_outdated(&project)
        .args(["--ignore", "not a name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid package name"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("cabal-outdated")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
