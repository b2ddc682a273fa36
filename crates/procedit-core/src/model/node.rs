//! Content nodes: the addressable elements of the edited tree
//!
//! Every node carries its own key, an optional parent key and a list of
//! validation errors; the kind-specific payload lives in `NodeKind`. Parents
//! refer to children by key only, so the store owns every node directly.

use procedit_core_types::TypeUnion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::config::ControlType;
use super::key::ContentKey;
use super::validation_error::{ValidationCode, ValidationError};

/// Slot name of a process's return argument
pub const RETURN_SLOT: &str = "return";

/// Discriminant of `NodeKind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Process,
    Block,
    Control,
    Action,
    Function,
    Argument,
    Value,
    Reference,
    Variable,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ContentKind::Process => "Process",
            ContentKind::Block => "Block",
            ContentKind::Control => "Control",
            ContentKind::Action => "Action",
            ContentKind::Function => "Function",
            ContentKind::Argument => "Argument",
            ContentKind::Value => "Value",
            ContentKind::Reference => "Reference",
            ContentKind::Variable => "Variable",
        };
        f.write_str(name)
    }
}

/// Reachability verdict for a reference at its current position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reachability {
    Valid,
    /// Producer sits in a conditional branch relative to the use
    Optional,
    Unreachable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessNode {
    pub name: String,
    pub external_id: Option<String>,
    /// Input variables, in declaration order
    pub inputs: Vec<ContentKey>,
    /// Logical slot name to argument key (e.g. the return slot)
    pub slots: BTreeMap<String, ContentKey>,
    pub root_block: ContentKey,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockNode {
    pub executables: Vec<ContentKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlNode {
    pub control_type: ControlType,
    pub blocks: Vec<ContentKey>,
    /// Named arguments; a conditional has exactly `condition`
    pub arguments: BTreeMap<String, ContentKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionNode {
    pub name: String,
    pub output_type: TypeUnion,
    pub output_multiple: bool,
    pub arguments: BTreeMap<String, ContentKey>,
    pub variable_key: Option<ContentKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub name: String,
    pub output_type: TypeUnion,
    pub output_multiple: bool,
    pub arguments: BTreeMap<String, ContentKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentNode {
    /// Parameter name in the owning callable
    pub name: String,
    pub declared_type: TypeUnion,
    pub multiple: bool,
    pub required: bool,
    /// Declared type plus all descendants
    pub allowed_type: TypeUnion,
    pub propagates: bool,
    pub calculated_type: TypeUnion,
    pub calculated_multiple: bool,
    pub children: Vec<ContentKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueNode {
    pub value: String,
    pub type_id: TypeUnion,
    /// Functions assignable at this position
    pub function_ids: Vec<String>,
    /// Variables assignable at this position
    pub variable_keys: Vec<ContentKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceNode {
    pub variable_key: ContentKey,
    pub path: Vec<String>,
    pub type_id: TypeUnion,
    pub multiple: bool,
    pub optional: bool,
    pub reachability: Reachability,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableNode {
    pub name: String,
    pub type_id: TypeUnion,
    pub multiple: bool,
    pub optional: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Non-owning back-list of references pointing here
    pub reference_keys: Vec<ContentKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Process(ProcessNode),
    Block(BlockNode),
    Control(ControlNode),
    Action(ActionNode),
    Function(FunctionNode),
    Argument(ArgumentNode),
    Value(ValueNode),
    Reference(ReferenceNode),
    Variable(VariableNode),
}

impl NodeKind {
    pub fn kind(&self) -> ContentKind {
        match self {
            NodeKind::Process(_) => ContentKind::Process,
            NodeKind::Block(_) => ContentKind::Block,
            NodeKind::Control(_) => ContentKind::Control,
            NodeKind::Action(_) => ContentKind::Action,
            NodeKind::Function(_) => ContentKind::Function,
            NodeKind::Argument(_) => ContentKind::Argument,
            NodeKind::Value(_) => ContentKind::Value,
            NodeKind::Reference(_) => ContentKind::Reference,
            NodeKind::Variable(_) => ContentKind::Variable,
        }
    }
}

/// One node in the content store
#[derive(Debug, Clone, PartialEq)]
pub struct ContentNode {
    pub key: ContentKey,
    pub parent_key: Option<ContentKey>,
    pub errors: Vec<ValidationError>,
    pub kind: NodeKind,
}

macro_rules! node_accessors {
    ($($variant:ident => $ty:ty, $get:ident, $get_mut:ident;)*) => {
        impl ContentNode {
            $(
                pub fn $get(&self) -> Option<&$ty> {
                    match &self.kind {
                        NodeKind::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }

                pub fn $get_mut(&mut self) -> Option<&mut $ty> {
                    match &mut self.kind {
                        NodeKind::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            )*
        }
    };
}

node_accessors! {
    Process => ProcessNode, as_process, as_process_mut;
    Block => BlockNode, as_block, as_block_mut;
    Control => ControlNode, as_control, as_control_mut;
    Action => ActionNode, as_action, as_action_mut;
    Function => FunctionNode, as_function, as_function_mut;
    Argument => ArgumentNode, as_argument, as_argument_mut;
    Value => ValueNode, as_value, as_value_mut;
    Reference => ReferenceNode, as_reference, as_reference_mut;
    Variable => VariableNode, as_variable, as_variable_mut;
}

impl ContentNode {
    pub fn new(key: ContentKey, parent_key: Option<ContentKey>, kind: NodeKind) -> Self {
        Self {
            key,
            parent_key,
            errors: Vec::new(),
            kind,
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.kind.kind()
    }

    /// Action or Control
    pub fn is_executable(&self) -> bool {
        matches!(self.kind, NodeKind::Action(_) | NodeKind::Control(_))
    }

    /// Value, Function or Reference
    pub fn is_expression(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Value(_) | NodeKind::Function(_) | NodeKind::Reference(_)
        )
    }

    /// Result type and multiplicity of an expression node
    pub fn expression_type(&self) -> Option<(&TypeUnion, bool)> {
        match &self.kind {
            NodeKind::Value(v) => Some((&v.type_id, false)),
            NodeKind::Function(f) => Some((&f.output_type, f.output_multiple)),
            NodeKind::Reference(r) => Some((&r.type_id, r.multiple)),
            _ => None,
        }
    }

    /// Owned children in canonical order
    pub fn children(&self) -> Vec<ContentKey> {
        match &self.kind {
            NodeKind::Process(p) => p
                .inputs
                .iter()
                .copied()
                .chain(p.slots.values().copied())
                .chain(std::iter::once(p.root_block))
                .collect(),
            NodeKind::Block(b) => b.executables.clone(),
            NodeKind::Control(c) => c
                .arguments
                .values()
                .copied()
                .chain(c.blocks.iter().copied())
                .collect(),
            NodeKind::Action(a) => a
                .arguments
                .values()
                .copied()
                .chain(a.variable_key)
                .collect(),
            NodeKind::Function(f) => f.arguments.values().copied().collect(),
            NodeKind::Argument(a) => a.children.clone(),
            NodeKind::Value(_) | NodeKind::Reference(_) | NodeKind::Variable(_) => Vec::new(),
        }
    }

    /// Named argument map of a callable-like node
    pub fn arguments(&self) -> Option<&BTreeMap<String, ContentKey>> {
        match &self.kind {
            NodeKind::Action(a) => Some(&a.arguments),
            NodeKind::Function(f) => Some(&f.arguments),
            NodeKind::Control(c) => Some(&c.arguments),
            NodeKind::Process(p) => Some(&p.slots),
            _ => None,
        }
    }

    pub fn has_error(&self, code: ValidationCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Drop every error of `code` (optionally only for one parameter)
    pub fn clear_errors(&mut self, code: ValidationCode, parameter: Option<&str>) {
        self.errors.retain(|e| {
            e.code != code || (parameter.is_some() && e.parameter.as_deref() != parameter)
        });
    }

    /// Replace the errors of `error.code` for the same parameter with `error`
    pub fn set_error(&mut self, error: ValidationError) {
        let parameter = error.parameter.clone();
        self.clear_errors(error.code, parameter.as_deref());
        self.errors.push(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argument(children: Vec<ContentKey>) -> ContentNode {
        ContentNode::new(
            ContentKey::new(1),
            Some(ContentKey::new(0)),
            NodeKind::Argument(ArgumentNode {
                name: "value".to_string(),
                declared_type: TypeUnion::single("string"),
                multiple: false,
                required: true,
                allowed_type: TypeUnion::single("string"),
                propagates: false,
                calculated_type: TypeUnion::empty(),
                calculated_multiple: false,
                children,
            }),
        )
    }

    #[test]
    fn test_accessors_match_kind() {
        let node = argument(vec![ContentKey::new(2)]);
        assert_eq!(node.kind(), ContentKind::Argument);
        assert!(node.as_argument().is_some());
        assert!(node.as_value().is_none());
        assert_eq!(node.children(), vec![ContentKey::new(2)]);
    }

    #[test]
    fn test_set_error_replaces_same_parameter_only() {
        let mut node = argument(vec![]);
        node.set_error(ValidationError::for_parameter(
            ValidationCode::UnsatisfiedInputTypeMismatch,
            "a",
            "first",
        ));
        node.set_error(ValidationError::for_parameter(
            ValidationCode::UnsatisfiedInputTypeMismatch,
            "b",
            "other",
        ));
        node.set_error(ValidationError::for_parameter(
            ValidationCode::UnsatisfiedInputTypeMismatch,
            "a",
            "second",
        ));
        assert_eq!(node.errors.len(), 2);
        assert!(node.errors.iter().any(|e| e.message == "second"));

        node.clear_errors(ValidationCode::UnsatisfiedInputTypeMismatch, Some("a"));
        assert_eq!(node.errors.len(), 1);
        assert_eq!(node.errors[0].parameter.as_deref(), Some("b"));

        node.clear_errors(ValidationCode::UnsatisfiedInputTypeMismatch, None);
        assert!(node.errors.is_empty());
    }
}
