//! Apply Atomicity Tests
//!
//! This test suite verifies the functional-boundary guarantees of the
//! apply() function.
//!
//! ## Scenarios Covered
//!
//! 1. Apply returns the new, revalidated state on success
//! 2. A failed command leaves the caller's clone untouched
//! 3. Apply surfaces typed errors and never panics

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use procedit_core::model::ContentKey;
use procedit_core::{apply, Command, EngineError, ExError, ExErrorKind, NeverGuardedPolicy};

#[test]
fn test_apply_returns_new_valid_state_on_success() {
    // GIVEN the sample process
    let state = state_from(&sample_process());
    let action = root_executable(&state, 0);
    let value = expression_of(&state, action, "variableName");

    // WHEN a literal is edited through apply
    let cmd = Command::SetValue {
        key: value,
        value: "Universe".to_string(),
    };
    let new_state = apply(state, cmd, &NeverGuardedPolicy).unwrap();

    // THEN the new state carries the edit
    assert_eq!(new_state.store.value(value).unwrap().value, "Universe");
}

#[test]
fn test_apply_fails_without_touching_the_callers_clone() {
    // GIVEN a state and a clone kept for rollback
    let state = state_from(&sample_process());
    let original = state.clone();
    let action = root_executable(&state, 0);

    // WHEN a command violates its contract
    let result = apply(
        state,
        Command::AddInputValue {
            argument: argument_of(&original, action, "value"),
        },
        &NeverGuardedPolicy,
    );

    // THEN it fails and the clone still exports the original document
    assert!(matches!(result, Err(EngineError::NotMultiValued { .. })));
    assert_eq!(original.export().unwrap(), sample_process());
}

#[test]
fn test_apply_on_missing_key_is_typed_error() {
    let state = state_from(&sample_process());
    let missing = ContentKey::new(123_456);

    let commands = vec![
        Command::SetValue {
            key: missing,
            value: "x".to_string(),
        },
        Command::DeleteItem { key: missing },
        Command::ConvertToValue { key: missing },
        Command::RenameVariable {
            variable: missing,
            name: "x".to_string(),
        },
    ];

    for cmd in commands {
        let op = cmd.op_name();
        let result = apply(state.clone(), cmd, &NeverGuardedPolicy);
        let err = result.expect_err(op);
        assert!(matches!(err, EngineError::NodeNotFound { .. }), "{}: {:?}", op, err);
        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::NotFound);
        assert_eq!(ex.code(), "ERR_NOT_FOUND");
    }
}

#[test]
fn test_apply_rejects_wrong_node_kind() {
    let state = state_from(&sample_process());
    let action = root_executable(&state, 0);

    // an action is not a value
    let result = apply(
        state.clone(),
        Command::SetValue {
            key: action,
            value: "x".to_string(),
        },
        &NeverGuardedPolicy,
    );
    assert!(matches!(result, Err(EngineError::WrongNodeKind { .. })));

    // an action is not a list of inputs
    let result = apply(
        state,
        Command::ReorderInput {
            argument: action,
            old_index: 0,
            new_index: 0,
        },
        &NeverGuardedPolicy,
    );
    assert!(matches!(result, Err(EngineError::WrongNodeKind { .. })));
}

#[test]
fn test_reorder_out_of_range_is_typed_error() {
    let state = state_from(&sample_process());
    let root_block = state.store.process(state.root).unwrap().root_block;

    let result = apply(
        state,
        Command::ReorderList {
            block: root_block,
            old_index: 0,
            new_index: 2,
        },
        &NeverGuardedPolicy,
    );
    assert!(matches!(
        result,
        Err(EngineError::IndexOutOfRange { index: 2, len: 2, .. })
    ));
}
