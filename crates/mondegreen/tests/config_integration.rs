//! Configuration integration tests.
//!
//! These verify config discovery, format parsing, and precedence end to end,
//! using `info --json` to read back the effective values.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

/// Run `info --json` from a directory and parse the JSON output.
fn info_json(dir: &std::path::Path) -> Value {
    let output = cmd()
        .args(["-C", dir.to_str().unwrap(), "info", "--json"])
        .output()
        .expect("failed to run command");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("invalid JSON output")
}

#[test]
fn runs_without_config_file() {
    let tmp = TempDir::new().unwrap();
    let json = info_json(tmp.path());
    assert_eq!(json["config"]["log_level"], "info");
    assert!(json["config"]["config_file"].is_null());
}

#[test]
fn discovers_dotfile_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".mondegreen.toml"), "min_segment_tokens = 2\n").unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["config"]["min_segment_tokens"], 2);
    let reported = json["config"]["config_file"].as_str().unwrap();
    assert!(reported.ends_with(".mondegreen.toml"), "{reported}");
}

#[test]
fn regular_file_beats_dotfile() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".mondegreen.toml"), "skip_rows = 1\n").unwrap();
    fs::write(tmp.path().join("mondegreen.yaml"), "skip_rows: 2\n").unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["config"]["skip_rows"], 2);
}

#[test]
fn config_in_parent_directory_is_found() {
    let tmp = TempDir::new().unwrap();
    let nested = tmp.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();
    fs::write(tmp.path().join("mondegreen.json"), r#"{"max_candidates": 9}"#).unwrap();

    let json = info_json(&nested);
    assert_eq!(json["config"]["max_candidates"], 9);
}

#[test]
fn explicit_config_overrides_discovered() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".mondegreen.toml"), "time_budget_ms = 100\n").unwrap();
    let explicit = tmp.path().join("custom.toml");
    fs::write(&explicit, "time_budget_ms = 900\n").unwrap();

    let output = cmd()
        .args(["-C", tmp.path().to_str().unwrap()])
        .arg("--config")
        .arg(&explicit)
        .args(["info", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["config"]["time_budget_ms"], 900);
}

#[test]
fn env_var_overrides_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".mondegreen.toml"), "min_segment_tokens = 2\n").unwrap();

    let output = cmd()
        .env("MONDEGREEN_MIN_SEGMENT_TOKENS", "7")
        .args(["-C", tmp.path().to_str().unwrap(), "info", "--json"])
        .output()
        .unwrap();
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["config"]["min_segment_tokens"], 7);
}

#[test]
fn configured_dictionary_is_used_by_search() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("words.tsv"),
        "word\tphonemes\nкот\tk o t\nкод\tk o d\n",
    )
    .unwrap();
    fs::write(
        tmp.path().join(".mondegreen.toml"),
        "dictionary = \"words.tsv\"\nskip_rows = 1\nmin_segment_tokens = 2\n",
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "search", "код"])
        .assert()
        .success()
        .stdout(predicate::str::diff("кот\nкод\n"));
}

#[test]
fn invalid_config_value_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".mondegreen.toml"), "min_segment_tokens = \"x\"\n").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

#[test]
fn log_dir_receives_log_file() {
    let tmp = TempDir::new().unwrap();
    let logs = tmp.path().join("logs");

    cmd()
        .env("MONDEGREEN_LOG_DIR", &logs)
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .success();
    assert!(logs.join("mondegreen.log").is_file());
}
