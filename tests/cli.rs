//! CLI test cases.
//!
//! The server needs a live Vision API key to do anything useful, so these
//! only cover argument handling and startup failures. The request pipeline
//! is tested in-process with a canned OCR engine.

use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

/// Create a new `Command` with our binary.
fn cmd() -> Command {
    Command::cargo_bin("labelscan").unwrap()
}

#[test]
fn test_help() {
    cmd().arg("--help").assert().success();
}

#[test]
fn test_version() {
    cmd().arg("--version").assert().success();
}

#[test]
fn test_missing_api_key() {
    cmd()
        .env_remove("GOOGLE_VISION_API_KEY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GOOGLE_VISION_API_KEY"));
}
