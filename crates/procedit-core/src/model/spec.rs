//! Engine specification: the read-only catalog of types and callables
//!
//! Supplied once per session. Everything the engine knows about which types
//! exist, how they relate, and what parameters each process, action and
//! function declares comes from here.

use procedit_core_types::{TypeId, TypeUnion};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::metadata::Metadata;

/// Top "any object" type; it has no literal form
pub const OBJECT_TYPE: &str = "object";

/// Literal fallback type used in place of `OBJECT_TYPE` for fresh values
pub const STRING_TYPE: &str = "string";

/// Type of a conditional's condition argument
pub const BOOLEAN_TYPE: &str = "boolean";

/// Complete engine specification
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSpec {
    #[serde(default)]
    pub types: BTreeMap<TypeId, TypeSpec>,

    #[serde(default)]
    pub processes: BTreeMap<String, CallableSpec>,

    #[serde(default)]
    pub actions: BTreeMap<String, CallableSpec>,

    #[serde(default)]
    pub functions: BTreeMap<String, CallableSpec>,
}

impl EngineSpec {
    pub fn type_spec(&self, id: &str) -> Option<&TypeSpec> {
        self.types.get(id)
    }

    pub fn process(&self, name: &str) -> Option<&CallableSpec> {
        self.processes.get(name)
    }

    pub fn action(&self, name: &str) -> Option<&CallableSpec> {
        self.actions.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&CallableSpec> {
        self.functions.get(name)
    }
}

/// Literal representation of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralFormat {
    Text,
    Integer,
    Decimal,
    Boolean,
}

/// One declared type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSpec {
    /// Direct supertypes
    #[serde(default)]
    pub parents: Vec<TypeId>,

    /// Fixed value enumeration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,

    /// Named compound properties
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertySpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<LiteralFormat>,

    /// Full-match regular expression for literal text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl TypeSpec {
    /// A type can be typed in as text iff it has a format or an enumeration
    pub fn has_literal_form(&self) -> bool {
        self.literal.is_some() || self.values.is_some()
    }
}

/// Property of a compound type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySpec {
    #[serde(rename = "type")]
    pub type_id: TypeUnion,

    #[serde(default)]
    pub multiple: bool,

    #[serde(default)]
    pub optional: bool,
}

/// Declared input parameter of a process, action or function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    #[serde(rename = "type")]
    pub type_id: TypeUnion,

    #[serde(default)]
    pub multiple: bool,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl ParameterSpec {
    pub fn new(type_id: impl Into<TypeUnion>) -> Self {
        Self {
            type_id: type_id.into(),
            multiple: false,
            required: false,
            metadata: Metadata::new(),
        }
    }

    pub fn propagates_type(&self) -> bool {
        self.metadata.propagates_type()
    }
}

/// Declared output of a callable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    #[serde(rename = "type")]
    pub type_id: TypeUnion,

    #[serde(default)]
    pub multiple: bool,

    #[serde(default)]
    pub optional: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Process, action or function description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallableSpec {
    #[serde(default)]
    pub inputs: BTreeMap<String, ParameterSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_engine_spec() {
        let json = r#"{
            "types": {
                "string": { "literal": "text" },
                "color": { "parents": ["string"], "values": ["red", "green"] },
                "point": { "properties": { "x": { "type": "integer" } } }
            },
            "actions": {
                "paint": {
                    "inputs": {
                        "color": { "type": "color", "required": true,
                                   "metadata": { "propagateType": true } }
                    },
                    "output": { "type": ["color"] }
                }
            }
        }"#;

        let spec: EngineSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.types.len(), 3);
        assert!(spec.type_spec("color").unwrap().has_literal_form());
        assert!(!spec.type_spec("point").unwrap().has_literal_form());

        let paint = spec.action("paint").unwrap();
        let color = &paint.inputs["color"];
        assert!(color.required);
        assert!(color.propagates_type());
        assert_eq!(color.type_id, TypeUnion::single("color"));
        assert!(spec.function("paint").is_none());
    }
}
