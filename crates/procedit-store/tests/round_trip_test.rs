// Integration tests for loading, exporting and writing configuration documents

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use procedit_core::errors::ExErrorKind;
use procedit_core::queries::collect_errors;
use procedit_core::NeverGuardedPolicy;
use procedit_store::{
    load_config_file, load_spec_file, open_session, write_config_file, Format,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

#[test]
fn test_load_spec_fixture() {
    // Given: The YAML engine specification
    let path = fixtures_dir().join("spec.yaml");

    // When: We load it
    let spec = load_spec_file(&path).unwrap();

    // Then: Types and callables are present
    assert_eq!(spec.types.len(), 4);
    assert!(spec.action("set-variable").unwrap().inputs["value"].propagates_type());
    assert!(spec.process("main").is_some());
}

#[test]
fn test_open_session_and_export() {
    // Given: A spec and a clean process configuration
    let spec = fixtures_dir().join("spec.yaml");
    let config = fixtures_dir().join("process.yaml");

    // When: We open a session
    let state = open_session(&spec, &config, &NeverGuardedPolicy).unwrap();

    // Then: No validation errors and export reproduces the document
    assert!(collect_errors(&state).is_empty());
    assert_eq!(state.export().unwrap(), load_config_file(&config).unwrap());
}

#[test]
fn test_write_then_reload_in_both_formats() {
    // Given: An exported configuration
    let state = open_session(
        &fixtures_dir().join("spec.yaml"),
        &fixtures_dir().join("process.yaml"),
        &NeverGuardedPolicy,
    )
    .unwrap();
    let exported = state.export().unwrap();
    let dir = tempfile::tempdir().unwrap();

    for name in ["out.json", "out.yaml"] {
        // When: It is written and read back
        let path = dir.path().join(name);
        write_config_file(&path, &exported).unwrap();

        // Then: Nothing is lost
        assert_eq!(load_config_file(&path).unwrap(), exported);
    }
    assert_eq!(
        Format::from_path(&dir.path().join("out.json")).unwrap(),
        Format::Json
    );
}

#[test]
fn test_invalid_literal_is_reported_not_fatal() {
    // Given: A JSON configuration with a bad integer literal
    let state = open_session(
        &fixtures_dir().join("spec.yaml"),
        &fixtures_dir().join("process_invalid.json"),
        &NeverGuardedPolicy,
    )
    .unwrap();

    // Then: The session opens and the error is recorded on the value
    let errors = collect_errors(&state);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error.code.as_str(), "MISSING_OR_INVALID_VALUE");
}

#[test]
fn test_missing_file_is_io_error() {
    let err = load_spec_file(&fixtures_dir().join("absent.yaml")).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Io);
}

#[test]
fn test_unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spec.toml");
    std::fs::write(&path, "types = {}").unwrap();

    let err = load_spec_file(&path).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Serialization);
    assert_eq!(err.op(), Some("detect_format"));
}

#[test]
fn test_unknown_action_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("process.json");
    std::fs::write(
        &config,
        r#"{"name": "main", "rootBlock": {"executables": [{"name": "launch"}]}}"#,
    )
    .unwrap();

    let err = open_session(&fixtures_dir().join("spec.yaml"), &config, &NeverGuardedPolicy)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::UnknownCallable);
    assert_eq!(err.op(), Some("construct"));
}
