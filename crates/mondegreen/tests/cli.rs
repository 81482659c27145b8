//! End-to-end CLI integration tests
//!
//! These tests invoke the compiled binary as a subprocess to verify
//! that the CLI behaves correctly from a user's perspective.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const DICTIONARY: &str = "\
# word\ttranscription
молоко\tm o l o k o
хорошо\tx o r o ʂ o
молот\tm o l o t
кот\tk o t
код\tk o d
";

/// Returns a Command configured to run our binary.
///
/// Note: `cargo_bin` is marked deprecated for edge cases involving custom
/// cargo build directories, but works correctly for standard project layouts.
#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

/// Write the test dictionary into a fresh temp dir.
fn dictionary() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("ru.tsv");
    fs::write(&path, DICTIONARY).unwrap();
    (tmp, path)
}

fn search(dict: &std::path::Path) -> Command {
    let mut command = cmd();
    command.arg("search").arg("--dictionary").arg(dict);
    command
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("MONDEGREEN_LOG_DIR"));
}

#[test]
fn no_arguments_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn version_flag_shows_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_only_prints_bare_version() {
    cmd()
        .arg("--version-only")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "{}\n",
            env!("CARGO_PKG_VERSION")
        )));
}

// =============================================================================
// Info Command
// =============================================================================

#[test]
fn info_shows_package_name_and_version() {
    cmd()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_NAME")))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn info_json_outputs_valid_json() {
    let output = cmd().arg("info").arg("--json").assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: Value = serde_json::from_str(&stdout).expect("info --json should be valid JSON");
    assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(json["config"]["min_segment_tokens"], 4);
}

// =============================================================================
// Search Command
// =============================================================================

#[test]
fn search_prints_accepted_phrases() {
    let (_tmp, dict) = dictionary();
    search(&dict)
        .args(["молоко", "молоко"])
        .assert()
        .success()
        .stdout(predicate::str::diff("молоко хорошо\nхорошо молоко\n"));
}

#[test]
fn search_without_grammar_keeps_repeats() {
    let (_tmp, dict) = dictionary();
    search(&dict)
        .args(["--no-grammar", "молоко", "молоко"])
        .assert()
        .success()
        .stdout(predicate::str::contains("хорошо хорошо"))
        .stdout(predicate::str::contains("молоко молоко"));
}

#[test]
fn search_prompts_when_phrase_missing() {
    let (_tmp, dict) = dictionary();
    search(&dict)
        .write_stdin("хорошо молоко\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Введите фразу:"))
        .stdout(predicate::str::contains("молоко хорошо"));
}

#[test]
fn search_json_reports_counts() {
    let (_tmp, dict) = dictionary();
    let output = search(&dict)
        .args(["--json", "молоко", "молоко"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["phrase"], "молоко молоко");
    assert_eq!(json["reference_stress"], "VVVVVV");
    assert_eq!(json["examined"], 4);
    assert_eq!(json["accepted"].as_array().unwrap().len(), 2);
    assert!(json["stopped"].is_null());
}

#[test]
fn search_limit_stops_early() {
    let (_tmp, dict) = dictionary();
    let output = search(&dict)
        .args(["--json", "--no-grammar", "-n", "1", "молоко", "молоко"])
        .output()
        .unwrap();
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["accepted"], serde_json::json!(["молоко молоко"]));
    assert_eq!(json["stopped"], "candidate-cap");
}

#[test]
fn short_word_needs_lower_min_segment() {
    let (_tmp, dict) = dictionary();
    search(&dict)
        .args(["--min-segment", "2", "кот"])
        .assert()
        .success()
        .stdout(predicate::str::diff("кот\nкод\n"));
    search(&dict)
        .arg("кот")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no homophones found"));
}

#[test]
fn unknown_word_is_echoed() {
    let (_tmp, dict) = dictionary();
    search(&dict)
        .arg("ыыы")
        .assert()
        .success()
        .stdout(predicate::str::diff("ыыы\n"));
}

#[test]
fn search_without_dictionary_fails() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "search", "кот"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no dictionary given"));
}

#[test]
fn malformed_dictionary_fails() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.tsv");
    fs::write(&path, "кот k o t\n").unwrap();
    search(&path)
        .arg("кот")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load dictionary"));
}

// =============================================================================
// Masks Command
// =============================================================================

#[test]
fn masks_json_describes_skeleton() {
    let (_tmp, dict) = dictionary();
    let output = cmd()
        .arg("masks")
        .arg("--dictionary")
        .arg(&dict)
        .args(["--json", "кот", "ыыы"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    let masks = json.as_array().unwrap();
    assert_eq!(masks.len(), 1);
    assert_eq!(masks[0]["vowels"], 1);
    let tokens = masks[0]["tokens"].as_array().unwrap();
    assert_eq!(tokens.len(), 4);
    assert_eq!(tokens[1]["value"], "o");
    assert_eq!(tokens[3]["kind"], "wildcard");
    assert!(masks[0]["pattern"].as_str().unwrap().ends_with(".*"));
}

#[test]
fn masks_requires_phrase() {
    let (_tmp, dict) = dictionary();
    cmd()
        .arg("masks")
        .arg("--dictionary")
        .arg(&dict)
        .assert()
        .failure();
}
