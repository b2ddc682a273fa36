//! Editing operations on expressions
//!
//! Every operation leaves the touched expression validated, its Argument
//! recomputed and the change propagated upwards before it returns.

use std::sync::Arc;

use procedit_core_types::TypeUnion;

use super::construct::{push_default_value, replace, replace_with_default_value};
use crate::engine::EngineState;
use crate::errors::{EngineError, Result};
use crate::model::{
    ContentKey, ContentKind, ExpressionConfig, FunctionConfig, NodeKind, Reachability,
    ReferenceNode,
};
use crate::policy::GuardPolicy;
use crate::rules::{
    propagate, refresh_reference_type, refresh_value_caches, revalidate_subtree,
    validate_reference, validate_value,
};
use crate::types::{resolve_path, ResolvedPath};

/// Replace the literal text of a Value
///
/// Only the value's own literal errors change; its type stays the same.
///
/// # Errors
/// `NodeNotFound` / `WrongNodeKind` if `value_key` is not a value.
pub fn set_value(state: &mut EngineState, value_key: ContentKey, text: String) -> Result<()> {
    let catalog = Arc::clone(&state.catalog);
    state.store.value_mut(value_key)?.value = text;
    validate_value(&mut state.store, &catalog, value_key)
}

/// Narrow a Value to one concrete type
///
/// # Errors
/// * `TypeNotAllowed` - type is outside the Argument's allowed type
/// * `NodeNotFound` / `WrongNodeKind` - `value_key` is not a value held by an argument
pub fn set_value_type(state: &mut EngineState, value_key: ContentKey, type_id: String) -> Result<()> {
    let catalog = Arc::clone(&state.catalog);
    state.store.value(value_key)?;
    let parent = state.store.parent_of(value_key)?;
    if !state.store.argument(parent)?.allowed_type.contains(&type_id) {
        return Err(EngineError::TypeNotAllowed {
            key: value_key,
            type_id,
        });
    }

    state.store.value_mut(value_key)?.type_id = TypeUnion::single(type_id);
    validate_value(&mut state.store, &catalog, value_key)?;
    propagate(&mut state.store, &catalog, value_key)?;
    refresh_value_caches(&mut state.store, &catalog, state.root)
}

/// Substitute any expression with one built from configuration
///
/// Selection follows the replacement.
///
/// # Errors
/// Construction errors, or `WrongNodeKind` if `key` is not an expression.
pub fn replace_expression(
    state: &mut EngineState,
    key: ContentKey,
    config: &ExpressionConfig,
    policy: &dyn GuardPolicy,
) -> Result<ContentKey> {
    let catalog = Arc::clone(&state.catalog);
    let new_key = replace(&mut state.store, &catalog, key, config)?;
    settle_replacement(state, key, new_key, policy)?;
    Ok(new_key)
}

/// Turn a Value into a call of `function_name`
///
/// Every declared parameter of the function gets an Argument holding an
/// empty default Value, multi-valued ones included.
///
/// # Errors
/// `WrongNodeKind` if `value_key` is not a value, `UnknownFunction` for an
/// undeclared function.
pub fn convert_value_to_function(
    state: &mut EngineState,
    value_key: ContentKey,
    function_name: &str,
    policy: &dyn GuardPolicy,
) -> Result<ContentKey> {
    let catalog = Arc::clone(&state.catalog);
    state.store.value(value_key)?;
    let config = ExpressionConfig::Function(FunctionConfig {
        name: function_name.to_string(),
        arguments: Default::default(),
    });
    let function = replace(&mut state.store, &catalog, value_key, &config)?;

    let arguments: Vec<ContentKey> = state
        .store
        .function(function)?
        .arguments
        .values()
        .copied()
        .collect();
    for argument in arguments {
        if state.store.argument(argument)?.children.is_empty() {
            push_default_value(&mut state.store, argument)?;
        }
    }

    settle_replacement(state, value_key, function, policy)?;
    Ok(function)
}

/// Turn a Value into a reference to `variable_key`, optionally into a property
///
/// # Errors
/// * `WrongNodeKind` - `value_key` is not a value or `variable_key` not a variable
/// * `InvalidPath` - `path` does not resolve from the variable's type
pub fn convert_value_to_reference(
    state: &mut EngineState,
    value_key: ContentKey,
    variable_key: ContentKey,
    path: Vec<String>,
    policy: &dyn GuardPolicy,
) -> Result<ContentKey> {
    let catalog = Arc::clone(&state.catalog);
    state.store.value(value_key)?;
    let variable = state.store.variable(variable_key)?;
    let start = ResolvedPath {
        type_id: variable.type_id.clone(),
        multiple: variable.multiple,
        optional: variable.optional,
    };
    let resolved = resolve_path(start, &path, catalog.spec(), catalog.types())?;

    let parent = state.store.parent_of(value_key)?;
    state.store.argument(parent)?;
    let reference = state.store.insert(
        Some(parent),
        NodeKind::Reference(ReferenceNode {
            variable_key,
            path,
            type_id: resolved.type_id,
            multiple: resolved.multiple,
            optional: resolved.optional,
            reachability: Reachability::Valid,
        }),
    );
    state
        .store
        .variable_mut(variable_key)?
        .reference_keys
        .push(reference);
    state.store.replace_child(parent, value_key, reference)?;
    state.store.recursive_delete(value_key)?;

    refresh_reference_type(&mut state.store, &catalog, reference)?;
    validate_reference(&mut state.store, reference, policy)?;
    propagate(&mut state.store, &catalog, reference)?;
    reselect(state, value_key, reference);
    refresh_value_caches(&mut state.store, &catalog, state.root)?;

    tracing::debug!(value = %value_key, reference = %reference, variable = %variable_key, "value converted to reference");
    Ok(reference)
}

/// Turn a Function or Reference back into an empty Value
///
/// # Errors
/// `WrongNodeKind` if `key` is not an expression held by an argument.
pub fn convert_to_value(state: &mut EngineState, key: ContentKey, policy: &dyn GuardPolicy) -> Result<ContentKey> {
    if !state.store.get(key)?.is_expression() {
        return Err(EngineError::WrongNodeKind {
            key,
            expected: ContentKind::Value,
            actual: state.store.get(key)?.kind(),
        });
    }
    let value = replace_with_default_value(&mut state.store, key)?;
    settle_replacement(state, key, value, policy)?;
    Ok(value)
}

/// Append an empty Value to a multi-valued Argument
///
/// # Errors
/// `NotMultiValued` if the argument takes a single expression.
pub fn add_input_value(state: &mut EngineState, argument_key: ContentKey) -> Result<ContentKey> {
    let catalog = Arc::clone(&state.catalog);
    if !state.store.argument(argument_key)?.multiple {
        return Err(EngineError::NotMultiValued { key: argument_key });
    }

    let value = push_default_value(&mut state.store, argument_key)?;
    validate_value(&mut state.store, &catalog, value)?;
    propagate(&mut state.store, &catalog, value)?;
    refresh_value_caches(&mut state.store, &catalog, state.root)?;
    Ok(value)
}

/// Validate a freshly substituted expression and push its type upwards
fn settle_replacement(
    state: &mut EngineState,
    old: ContentKey,
    new: ContentKey,
    policy: &dyn GuardPolicy,
) -> Result<()> {
    let catalog = Arc::clone(&state.catalog);
    revalidate_subtree(&mut state.store, &catalog, new, policy)?;
    propagate(&mut state.store, &catalog, new)?;
    reselect(state, old, new);
    refresh_value_caches(&mut state.store, &catalog, state.root)
}

fn reselect(state: &mut EngineState, old: ContentKey, new: ContentKey) {
    if state.selection == Some(old) {
        state.selection = Some(new);
    } else if state.selection.is_some_and(|k| !state.store.contains(k)) {
        state.selection = None;
    }
}
