//! Content query operations
//!
//! Queries accept any key inside an argument position: the Argument itself
//! or one of the expressions it holds.

use serde::Serialize;

use crate::engine::EngineState;
use crate::errors::{EngineError, Result};
use crate::model::{
    ContentKey, ContentKind, ContentNode, NodeKind, ParameterSpec, Reachability, ValidationError,
    RETURN_SLOT,
};
use crate::ops::construct::{condition_parameter, CONDITION_SLOT};
use crate::rules::{assignable_functions, classify_variable};
use crate::types::matches_requirement;

/// Validation error together with the node it is recorded on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeError {
    pub key: ContentKey,
    pub kind: ContentKind,
    pub error: ValidationError,
}

/// Currently selected node, if any
pub fn selection(state: &EngineState) -> Option<&ContentNode> {
    state.selection.and_then(|k| state.store.get(k).ok())
}

/// Look up a node by key
///
/// # Errors
/// `NodeNotFound` if the key is not in the store.
pub fn content(state: &EngineState, key: ContentKey) -> Result<&ContentNode> {
    state.store.get(key)
}

/// Declared parameter behind an argument position
///
/// Returns `None` for keys that are not an Argument or an expression held by
/// one (executables, blocks, variables, the process).
///
/// # Errors
/// `NodeNotFound` for a missing key or owner.
pub fn parameter_spec_for(state: &EngineState, key: ContentKey) -> Result<Option<ParameterSpec>> {
    let Some(argument_key) = argument_position(state, key)? else {
        return Ok(None);
    };
    let name = state.store.argument(argument_key)?.name.clone();
    let owner = state.store.parent_of(argument_key)?;
    let spec = state.spec();

    let param = match &state.store.get(owner)?.kind {
        NodeKind::Action(action) => spec
            .action(&action.name)
            .and_then(|a| a.inputs.get(&name))
            .cloned(),
        NodeKind::Function(function) => spec
            .function(&function.name)
            .and_then(|f| f.inputs.get(&name))
            .cloned(),
        NodeKind::Control(_) if name == CONDITION_SLOT => Some(condition_parameter()),
        NodeKind::Process(process) if name == RETURN_SLOT => spec
            .process(&process.name)
            .and_then(|p| p.output.as_ref())
            .map(|output| ParameterSpec {
                multiple: output.multiple,
                required: !output.optional,
                ..ParameterSpec::new(output.type_id.clone())
            }),
        _ => None,
    };
    Ok(param)
}

/// Variables readable at `key` with their verdict, unreachable ones omitted
///
/// At an argument position only variables whose type satisfies the allowed
/// type are listed; anywhere else every readable variable is.
///
/// # Errors
/// `NodeNotFound` for a missing key.
pub fn available_variables_for(
    state: &EngineState,
    key: ContentKey,
) -> Result<Vec<(ContentKey, Reachability)>> {
    let allowed = match argument_position(state, key)? {
        Some(argument) => Some(state.store.argument(argument)?.allowed_type.clone()),
        None => None,
    };

    let mut out = Vec::new();
    for variable_key in state.store.keys() {
        let Some(variable) = state.store.get(variable_key)?.as_variable() else {
            continue;
        };
        if let Some(allowed) = &allowed {
            if !matches_requirement(&variable.type_id, allowed, state.catalog.types()) {
                continue;
            }
        }
        match classify_variable(&state.store, variable_key, key)? {
            Reachability::Unreachable => {}
            verdict => out.push((variable_key, verdict)),
        }
    }
    Ok(out)
}

/// Functions whose output satisfies the allowed type at `key`
///
/// # Errors
/// `WrongNodeKind` if `key` is not an argument position.
pub fn available_functions_for(state: &EngineState, key: ContentKey) -> Result<Vec<String>> {
    let argument = argument_position(state, key)?.ok_or_else(|| EngineError::WrongNodeKind {
        key,
        expected: ContentKind::Argument,
        actual: state.store.get(key).map(|n| n.kind()).unwrap_or(ContentKind::Argument),
    })?;
    let allowed = &state.store.argument(argument)?.allowed_type;
    Ok(assignable_functions(&state.catalog, allowed))
}

/// Every validation error in the tree, ordered by node key
pub fn collect_errors(state: &EngineState) -> Vec<NodeError> {
    state
        .store
        .keys()
        .into_iter()
        .filter_map(|k| state.store.get(k).ok())
        .flat_map(|node| {
            node.errors.iter().map(|error| NodeError {
                key: node.key,
                kind: node.kind(),
                error: error.clone(),
            })
        })
        .collect()
}

/// The Argument at `key`, or the Argument holding the expression at `key`
fn argument_position(state: &EngineState, key: ContentKey) -> Result<Option<ContentKey>> {
    let node = state.store.get(key)?;
    if node.kind() == ContentKind::Argument {
        return Ok(Some(key));
    }
    if !node.is_expression() {
        return Ok(None);
    }
    match node.parent_key {
        Some(parent) if state.store.get(parent)?.kind() == ContentKind::Argument => Ok(Some(parent)),
        _ => Ok(None),
    }
}
