//! Configuration document: the import/export form of a process tree
//!
//! This is the only boundary between the engine and storage. Expressions and
//! executables are discriminated by shape, so the serialized form carries no
//! explicit tag apart from `controlType`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root of a configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProcessConfig {
    /// Name of the process in the engine specification
    pub name: String,

    pub root_block: BlockConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_expression: Option<ExpressionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BlockConfig {
    #[serde(default)]
    pub executables: Vec<ExecutableConfig>,
}

/// Action or control statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExecutableConfig {
    Control(ControlConfig),
    Action(ActionConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActionConfig {
    pub name: String,

    #[serde(default)]
    pub arguments: BTreeMap<String, Vec<ExpressionConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Output binding of an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OutputConfig {
    /// Variable name the output is bound to
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlType {
    #[serde(rename = "CONDITIONAL")]
    Conditional,
}

impl std::fmt::Display for ControlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlType::Conditional => write!(f, "CONDITIONAL"),
        }
    }
}

/// Conditional: `blocks` holds the then-block followed by the else-block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ControlConfig {
    pub control_type: ControlType,
    pub blocks: Vec<BlockConfig>,
    pub condition: ExpressionConfig,
}

/// Value, function call or reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpressionConfig {
    Value(ValueConfig),
    Reference(ReferenceConfig),
    Function(FunctionConfig),
}

impl ExpressionConfig {
    pub fn value(value: impl Into<String>, type_id: impl Into<String>) -> Self {
        ExpressionConfig::Value(ValueConfig {
            value: value.into(),
            type_id: type_id.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ValueConfig {
    pub value: String,
    pub type_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FunctionConfig {
    pub name: String,

    #[serde(default)]
    pub arguments: BTreeMap<String, Vec<ExpressionConfig>>,
}

/// Reference to an action output (or, with empty coordinates, a process input
/// named by the first path segment)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReferenceConfig {
    pub coordinates: Vec<usize>,

    #[serde(default)]
    pub path: Vec<String>,
}
