//! CLI integration tests
//!
//! These run the built binary against the store crate's fixture documents.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../procedit-store/tests/fixtures")
        .join(name)
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_procedit"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute CLI")
}

fn path_arg(path: &std::path::Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_check_valid_process_succeeds() {
    // GIVEN: the sample process, which carries no validation errors
    let spec = fixture("spec.yaml");
    let config = fixture("process.yaml");

    // WHEN: checking it
    let output = run(&["check", path_arg(&spec), path_arg(&config)]);

    // THEN: exit code 0 and an OK summary
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("OK (0 warning(s))"), "stdout: {}", stdout);
}

#[test]
fn test_check_invalid_literal_fails_and_reports() {
    // GIVEN: a process whose integer argument holds "many"
    let spec = fixture("spec.yaml");
    let config = fixture("process_invalid.json");

    // WHEN: checking it
    let output = run(&["check", path_arg(&spec), path_arg(&config)]);

    // THEN: the error is listed on stdout and the command fails
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("MISSING_OR_INVALID_VALUE"), "stdout: {}", stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: 1 blocking validation error(s)"), "stderr: {}", stderr);
}

#[test]
fn test_check_missing_file_fails() {
    let spec = fixture("spec.yaml");
    let output = run(&["check", path_arg(&spec), "does-not-exist.yaml"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error:"));
}

#[test]
fn test_export_to_stdout_as_json() {
    let spec = fixture("spec.yaml");
    let config = fixture("process.yaml");

    let output = run(&[
        "export",
        path_arg(&spec),
        path_arg(&config),
        "--format",
        "json",
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim_start().starts_with('{'));
    assert!(stdout.contains("\"greetingVar\""));
    assert!(stdout.contains("\"increment-counter\""));
}

#[test]
fn test_export_to_file_then_check_it() {
    // GIVEN: a temp directory
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("exported.json");
    let spec = fixture("spec.yaml");
    let config = fixture("process.yaml");

    // WHEN: exporting to a .json file
    let output = run(&[
        "export",
        path_arg(&spec),
        path_arg(&config),
        "--output",
        path_arg(&out),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    // THEN: the file exists and checks clean
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("\"counter\""));
    let output = run(&["check", path_arg(&spec), path_arg(&out)]);
    assert!(output.status.success());
}

#[test]
fn test_export_rejects_unknown_format() {
    let spec = fixture("spec.yaml");
    let config = fixture("process.yaml");

    let output = run(&[
        "export",
        path_arg(&spec),
        path_arg(&config),
        "--format",
        "toml",
    ]);

    assert!(!output.status.success());
}
