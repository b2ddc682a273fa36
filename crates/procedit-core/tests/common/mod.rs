use std::sync::Arc;

use procedit_core::model::{
    ActionConfig, BlockConfig, ControlConfig, ControlType, ExecutableConfig, ExpressionConfig,
    OutputConfig, ProcessConfig, ReferenceConfig,
};
use procedit_core::{Catalog, ContentKey, EngineSpec, EngineState, NeverGuardedPolicy};

/// Engine specification shared by the scenario tests
///
/// object <- string <- color, email
///        <- integer
///        <- boolean
///        <- point { x: integer, y: integer, label?: string }
#[allow(dead_code)]
pub const SPEC_JSON: &str = r#"{
    "types": {
        "object": {},
        "string": { "parents": ["object"], "literal": "text" },
        "integer": { "parents": ["object"], "literal": "integer", "min": 0, "max": 1000 },
        "boolean": { "parents": ["object"], "literal": "boolean" },
        "color": { "parents": ["string"], "values": ["red", "green", "blue"] },
        "email": { "parents": ["string"], "literal": "text", "pattern": "[^@]+@[^@]+" },
        "point": {
            "parents": ["object"],
            "properties": {
                "x": { "type": "integer" },
                "y": { "type": "integer" },
                "label": { "type": "string", "optional": true }
            }
        }
    },
    "processes": {
        "main": {
            "inputs": {
                "greeting": { "type": "string", "required": true },
                "origin": { "type": "point" }
            },
            "output": { "type": "string", "optional": true }
        }
    },
    "actions": {
        "set-variable": {
            "inputs": {
                "value": { "type": "object", "required": true,
                           "metadata": { "propagateType": true } },
                "variableName": { "type": "string", "required": true }
            },
            "output": { "type": "object" }
        },
        "increment-counter": {
            "inputs": {
                "variableName": { "type": "string", "required": true },
                "count": { "type": "integer", "required": true }
            },
            "output": { "type": "integer" }
        },
        "log": {
            "inputs": {
                "message": { "type": "string", "required": true },
                "tags": { "type": "string", "multiple": true }
            }
        },
        "make-point": {
            "inputs": {},
            "output": { "type": "point" }
        }
    },
    "functions": {
        "concat": {
            "inputs": { "parts": { "type": "string", "multiple": true, "required": true } },
            "output": { "type": "string" }
        },
        "add": {
            "inputs": {
                "left": { "type": "integer", "required": true },
                "right": { "type": "integer", "required": true }
            },
            "output": { "type": "integer" }
        },
        "identity": {
            "inputs": { "value": { "type": "object", "required": true,
                                   "metadata": { "propagateType": true } } },
            "output": { "type": "object" }
        },
        "is-empty": {
            "inputs": { "text": { "type": "string" } },
            "output": { "type": "boolean" }
        }
    }
}"#;

#[allow(dead_code)]
pub fn spec() -> EngineSpec {
    serde_json::from_str(SPEC_JSON).unwrap()
}

#[allow(dead_code)]
pub fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::load(spec()).unwrap())
}

/// Build a state from a configuration with the default policy
#[allow(dead_code)]
pub fn state_from(config: &ProcessConfig) -> EngineState {
    EngineState::from_config(catalog(), config, &NeverGuardedPolicy).unwrap()
}

#[allow(dead_code)]
pub fn process(executables: Vec<ExecutableConfig>) -> ProcessConfig {
    ProcessConfig {
        name: "main".to_string(),
        root_block: BlockConfig { executables },
        return_expression: None,
        external_id: None,
    }
}

#[allow(dead_code)]
pub fn value(text: &str, type_id: &str) -> ExpressionConfig {
    ExpressionConfig::value(text, type_id)
}

#[allow(dead_code)]
pub fn reference(coordinates: &[usize], path: &[&str]) -> ExpressionConfig {
    ExpressionConfig::Reference(ReferenceConfig {
        coordinates: coordinates.to_vec(),
        path: path.iter().map(|s| s.to_string()).collect(),
    })
}

/// Action config with single-expression arguments
#[allow(dead_code)]
pub fn action(
    name: &str,
    arguments: Vec<(&str, ExpressionConfig)>,
    output: Option<&str>,
) -> ExecutableConfig {
    ExecutableConfig::Action(ActionConfig {
        name: name.to_string(),
        arguments: arguments
            .into_iter()
            .map(|(k, v)| (k.to_string(), vec![v]))
            .collect(),
        output: output.map(|name| OutputConfig {
            name: name.to_string(),
            description: None,
        }),
    })
}

#[allow(dead_code)]
pub fn conditional(
    condition: ExpressionConfig,
    then_block: Vec<ExecutableConfig>,
    else_block: Vec<ExecutableConfig>,
) -> ExecutableConfig {
    ExecutableConfig::Control(ControlConfig {
        control_type: ControlType::Conditional,
        blocks: vec![
            BlockConfig {
                executables: then_block,
            },
            BlockConfig {
                executables: else_block,
            },
        ],
        condition,
    })
}

/// The two-action sample process:
/// `set-variable(value="Hello", variableName="World")` then
/// `increment-counter(variableName="counterVar", count="2")`
#[allow(dead_code)]
pub fn sample_process() -> ProcessConfig {
    process(vec![
        action(
            "set-variable",
            vec![
                ("value", value("Hello", "string")),
                ("variableName", value("World", "string")),
            ],
            Some("greetingVar"),
        ),
        action(
            "increment-counter",
            vec![
                ("variableName", value("counterVar", "string")),
                ("count", value("2", "integer")),
            ],
            Some("counter"),
        ),
    ])
}

/// Executable at `index` in the root block
#[allow(dead_code)]
pub fn root_executable(state: &EngineState, index: usize) -> ContentKey {
    let root_block = state.store.process(state.root).unwrap().root_block;
    state.store.block(root_block).unwrap().executables[index]
}

/// Argument `name` of a callable node
#[allow(dead_code)]
pub fn argument_of(state: &EngineState, owner: ContentKey, name: &str) -> ContentKey {
    state.store.get(owner).unwrap().arguments().unwrap()[name]
}

/// Sole (or first) expression of argument `name`
#[allow(dead_code)]
pub fn expression_of(state: &EngineState, owner: ContentKey, name: &str) -> ContentKey {
    let argument = argument_of(state, owner, name);
    state.store.argument(argument).unwrap().children[0]
}

/// Output variable of an action
#[allow(dead_code)]
pub fn variable_of(state: &EngineState, action: ContentKey) -> ContentKey {
    state.store.action(action).unwrap().variable_key.unwrap()
}
