use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata key marking a parameter whose type shapes its callable's output type
pub const PROPAGATE_TYPE_KEY: &str = "propagateType";

/// Free-form parameter metadata from the engine specification
///
/// Stores arbitrary values as JSON so the catalog can carry presentation
/// hints alongside the few keys the engine interprets itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Metadata {
    data: BTreeMap<String, serde_json::Value>,
}

impl Metadata {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Boolean flag; absent or non-boolean values read as false
    pub fn flag(&self, key: &str) -> bool {
        self.data
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    /// Whether the parameter's calculated type flows into its callable's output
    pub fn propagates_type(&self) -> bool {
        self.flag(PROPAGATE_TYPE_KEY)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<BTreeMap<String, serde_json::Value>> for Metadata {
    fn from(data: BTreeMap<String, serde_json::Value>) -> Self {
        Self { data }
    }
}
