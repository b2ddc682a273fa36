//! Construction / export tests
//!
//! ## Scenarios Covered
//!
//! 1. The two-action sample exports its four literals verbatim, in order
//! 2. Export followed by construction reproduces the same document
//! 3. Construction rejects configurations that break the catalog's contract
//! 4. Editor-created state (union-typed literals, added list entries)
//!    survives export and reconstruction

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use procedit_core::model::{
    ActionConfig, ExecutableConfig, ExpressionConfig, FunctionConfig, OutputConfig,
    ProcessConfig, ValueConfig,
};
use procedit_core::rules::invariants::check_tree;
use procedit_core::{
    apply, Catalog, Command, EngineError, EngineSpec, EngineState, NeverGuardedPolicy,
};
use std::collections::BTreeMap;
use std::sync::Arc;

fn literal(expressions: &[ExpressionConfig]) -> &str {
    match expressions {
        [ExpressionConfig::Value(ValueConfig { value, .. })] => value.as_str(),
        other => panic!("expected a single literal, got {:?}", other),
    }
}

fn as_action(executable: &ExecutableConfig) -> &ActionConfig {
    match executable {
        ExecutableConfig::Action(action) => action,
        other => panic!("expected an action, got {:?}", other),
    }
}

#[test]
fn test_sample_export_reproduces_literals() {
    // GIVEN the two-action sample process
    let state = state_from(&sample_process());

    // WHEN it is exported
    let exported = state.export().unwrap();

    // THEN both actions come back in order with their literals verbatim
    let executables = &exported.root_block.executables;
    assert_eq!(executables.len(), 2);

    let first = as_action(&executables[0]);
    assert_eq!(first.name, "set-variable");
    assert_eq!(literal(&first.arguments["value"]), "Hello");
    assert_eq!(literal(&first.arguments["variableName"]), "World");

    let second = as_action(&executables[1]);
    assert_eq!(second.name, "increment-counter");
    assert_eq!(literal(&second.arguments["variableName"]), "counterVar");
    assert_eq!(literal(&second.arguments["count"]), "2");

    assert_eq!(exported, sample_process());
}

/// Conditional, references into inputs and properties, a function call and
/// a multi-valued argument
fn rich_process() -> ProcessConfig {
    let mut config = process(vec![
        action("make-point", vec![], Some("p")),
        conditional(
            value("true", "boolean"),
            vec![action(
                "increment-counter",
                vec![
                    ("variableName", value("steps", "string")),
                    ("count", reference(&[0], &["x"])),
                ],
                Some("steps"),
            )],
            vec![action("log", vec![("message", reference(&[], &["greeting"]))], None)],
        ),
        ExecutableConfig::Action(ActionConfig {
            name: "log".to_string(),
            arguments: BTreeMap::from([
                (
                    "message".to_string(),
                    vec![ExpressionConfig::Function(FunctionConfig {
                        name: "concat".to_string(),
                        arguments: BTreeMap::from([(
                            "parts".to_string(),
                            vec![value("a", "string"), reference(&[], &["greeting"])],
                        )]),
                    })],
                ),
                (
                    "tags".to_string(),
                    vec![value("one", "string"), value("two", "string")],
                ),
            ]),
            output: None,
        }),
        ExecutableConfig::Action(ActionConfig {
            name: "set-variable".to_string(),
            arguments: BTreeMap::from([
                ("value".to_string(), vec![reference(&[], &["origin", "y"])]),
                ("variableName".to_string(), vec![value("y", "string")]),
            ]),
            output: Some(OutputConfig {
                name: "copy".to_string(),
                description: Some("copied coordinate".to_string()),
            }),
        }),
    ]);
    config.return_expression = Some(reference(&[], &["greeting"]));
    config.external_id = Some("ext-7".to_string());
    config
}

#[test]
fn test_export_construct_round_trip() {
    // GIVEN a state built from a configuration in canonical form
    let config = rich_process();
    let state = state_from(&config);
    check_tree(&state.store, state.root).unwrap();

    // WHEN it is exported and rebuilt
    let exported = state.export().unwrap();
    let rebuilt = state_from(&exported);

    // THEN both exports equal the original document
    assert_eq!(exported, config);
    assert_eq!(rebuilt.export().unwrap(), config);
    assert_eq!(rebuilt.store.len(), state.store.len());
}

#[test]
fn test_added_list_entry_survives_round_trip() {
    // GIVEN a log action whose multi-valued "tags" argument gained an empty entry
    let state = state_from(&process(vec![action(
        "log",
        vec![("message", value("hi", "string"))],
        None,
    )]));
    let log = root_executable(&state, 0);
    let tags = argument_of(&state, log, "tags");
    let state = apply(
        state,
        Command::AddInputValue { argument: tags },
        &NeverGuardedPolicy,
    )
    .unwrap();

    // WHEN exported
    let exported = state.export().unwrap();

    // THEN the entry is written out and construction keeps it
    let tags_config = &as_action(&exported.root_block.executables[0]).arguments["tags"];
    assert_eq!(tags_config, &vec![value("", "string")]);

    let rebuilt = state_from(&exported);
    let rebuilt_log = root_executable(&rebuilt, 0);
    let rebuilt_tags = argument_of(&rebuilt, rebuilt_log, "tags");
    assert_eq!(rebuilt.store.argument(rebuilt_tags).unwrap().children.len(), 1);
    assert_eq!(rebuilt.export().unwrap(), exported);
}

#[test]
fn test_union_typed_literal_exports_accepting_member() {
    // GIVEN log with an optional payload typed integer | string
    let mut raw: serde_json::Value = serde_json::from_str(SPEC_JSON).unwrap();
    raw["actions"]["log"]["inputs"]["payload"] =
        serde_json::json!({ "type": ["integer", "string"] });
    let spec: EngineSpec = serde_json::from_value(raw).unwrap();
    let catalog = Arc::new(Catalog::load(spec).unwrap());
    let config = process(vec![action(
        "log",
        vec![("message", value("hi", "string"))],
        None,
    )]);
    let state = EngineState::from_config(Arc::clone(&catalog), &config, &NeverGuardedPolicy)
        .unwrap();
    let log = root_executable(&state, 0);
    let payload = expression_of(&state, log, "payload");
    assert_eq!(
        state.store.value(payload).unwrap().type_id.as_slice(),
        &["integer", "string"]
    );

    // WHEN the payload becomes a non-numeric literal
    let state = apply(
        state,
        Command::SetValue {
            key: payload,
            value: "hello".to_string(),
        },
        &NeverGuardedPolicy,
    )
    .unwrap();
    assert!(state.store.get(payload).unwrap().errors.is_empty());

    // THEN export names the member that accepts it and the rebuilt value stays valid
    let exported = state.export().unwrap();
    let payload_config = &as_action(&exported.root_block.executables[0]).arguments["payload"];
    assert_eq!(payload_config, &vec![value("hello", "string")]);

    let rebuilt = EngineState::from_config(catalog, &exported, &NeverGuardedPolicy).unwrap();
    let rebuilt_payload = expression_of(&rebuilt, root_executable(&rebuilt, 0), "payload");
    assert!(rebuilt.store.get(rebuilt_payload).unwrap().errors.is_empty());
}

#[test]
fn test_round_trip_through_json() {
    let config = rich_process();
    let json = serde_json::to_string(&state_from(&config).export().unwrap()).unwrap();
    let parsed: ProcessConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_unknown_parameter_is_fatal() {
    let config = process(vec![action(
        "log",
        vec![("volume", value("11", "integer"))],
        None,
    )]);
    let result = EngineState::from_config(catalog(), &config, &NeverGuardedPolicy);
    assert!(matches!(
        result,
        Err(EngineError::UnknownParameter { ref parameter, .. }) if parameter == "volume"
    ));
}

#[test]
fn test_unknown_callables_are_fatal() {
    let result = EngineState::from_config(
        catalog(),
        &process(vec![action("launch", vec![], None)]),
        &NeverGuardedPolicy,
    );
    assert!(matches!(result, Err(EngineError::UnknownAction { .. })));

    let mut config = process(vec![]);
    config.name = "missing".to_string();
    let result = EngineState::from_config(catalog(), &config, &NeverGuardedPolicy);
    assert!(matches!(result, Err(EngineError::UnknownProcess { .. })));
}

#[test]
fn test_output_on_action_without_output_is_fatal() {
    let config = process(vec![action(
        "log",
        vec![("message", value("hi", "string"))],
        Some("nothing"),
    )]);
    let result = EngineState::from_config(catalog(), &config, &NeverGuardedPolicy);
    assert!(matches!(result, Err(EngineError::MissingOutput { .. })));
}

#[test]
fn test_unresolved_references_are_fatal() {
    // coordinates past the end of the block
    let config = process(vec![action(
        "set-variable",
        vec![("value", reference(&[5], &[]))],
        None,
    )]);
    let result = EngineState::from_config(catalog(), &config, &NeverGuardedPolicy);
    assert!(matches!(result, Err(EngineError::UnresolvedCoordinates { .. })));

    // an action without an output variable
    let config = process(vec![
        action("log", vec![("message", value("hi", "string"))], None),
        action("set-variable", vec![("value", reference(&[0], &[]))], None),
    ]);
    let result = EngineState::from_config(catalog(), &config, &NeverGuardedPolicy);
    assert!(matches!(result, Err(EngineError::UnresolvedCoordinates { .. })));

    // an undeclared process input
    let config = process(vec![action(
        "set-variable",
        vec![("value", reference(&[], &["nope"]))],
        None,
    )]);
    let result = EngineState::from_config(catalog(), &config, &NeverGuardedPolicy);
    assert!(matches!(result, Err(EngineError::UnknownInput { .. })));
}

#[test]
fn test_several_expressions_for_single_parameter_are_fatal() {
    let config = process(vec![ExecutableConfig::Action(ActionConfig {
        name: "log".to_string(),
        arguments: BTreeMap::from([(
            "message".to_string(),
            vec![value("a", "string"), value("b", "string")],
        )]),
        output: None,
    })]);
    let result = EngineState::from_config(catalog(), &config, &NeverGuardedPolicy);
    assert!(matches!(result, Err(EngineError::NotMultiValued { .. })));
}
