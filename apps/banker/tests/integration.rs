//! Integration tests for the banker CLI

use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

fn banker(args: &[&str], config: &NamedTempFile) -> Output {
    Command::new(env!("CARGO_BIN_EXE_banker"))
        .args(args)
        .arg("--config")
        .arg(config.path())
        .env_remove("BANKER_CONSUMERS")
        .env_remove("BANKER_HOLD_MS")
        .env_remove("BANKER_PAUSE_MS")
        .env_remove("BANKER_SEED")
        .env_remove("BANKER_JSON")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute banker")
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_banker"))
        .arg("--version")
        .output()
        .expect("Failed to execute banker");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("banker"));
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_banker"))
        .arg("--help")
        .output()
        .expect("Failed to execute banker");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Banker's algorithm"));
    assert!(stdout.contains("--consumers"));
    assert!(stdout.contains("--duration"));
}

#[test]
fn test_missing_capacity_is_usage_error() {
    let output = banker(&[], &config_file(""));
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_zero_capacity_is_usage_error() {
    let output = banker(&["10", "0", "7"], &config_file(""));
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_table_mismatch_fails_before_running() {
    let config = config_file(
        r#"
[simulation]
consumers = 2

[demand]
policy = "table"
maxima = [[1, 1], [2, 2]]
"#,
    );
    let output = banker(&["3", "3", "3", "--duration", "1"], &config);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_banker"))
        .args(["3", "--config"])
        .arg(dir.path().join("absent.toml"))
        .output()
        .expect("Failed to execute banker");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_json_run_emits_events_and_reports() {
    let config = config_file(
        r"
[simulation]
hold_ms = 20
pause_ms = 10
",
    );
    let output = banker(
        &[
            "10",
            "5",
            "7",
            "--consumers",
            "3",
            "--seed",
            "4",
            "--duration",
            "1",
            "--json",
        ],
        &config,
    );

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("every stdout line is JSON"))
        .collect();

    let first = &lines[0];
    assert_eq!(first["event"]["domain"], "ledger");
    assert_eq!(first["event"]["event"]["type"], "initialized");
    assert_eq!(
        first["event"]["event"]["capacity"],
        serde_json::json!([10, 5, 7])
    );
    assert_eq!(
        first["event"]["event"]["maxima"]
            .as_array()
            .map(Vec::len),
        Some(3)
    );

    let last = lines.last().unwrap();
    let reports = last["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|report| report["failure"].is_null()));
}
