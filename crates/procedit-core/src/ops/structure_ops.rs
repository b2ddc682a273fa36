//! Editing operations that change the shape of the tree
//!
//! Deleting, inserting, moving and reordering all shift coordinates, so each
//! re-classifies the references whose verdict can change and refreshes the
//! assignable-variable caches.

use std::collections::HashSet;
use std::sync::Arc;

use super::construct::{
    insert_executable as build_executable, push_default_value, replace_with_default_value,
};
use crate::engine::EngineState;
use crate::errors::{EngineError, Result};
use crate::model::{ContentKey, ExecutableConfig};
use crate::policy::GuardPolicy;
use crate::rules::{
    affected_references, propagate, propagate_argument, refresh_value_caches,
    revalidate_references, revalidate_subtree, validate_value,
};
use crate::traversal::{collect_down, WalkOrder};

/// Delete an expression or an executable
///
/// A single-valued Argument left empty gets a fresh empty Value. References
/// outside a deleted executable that read a variable it produced are turned
/// into empty Values, so no key dangles afterwards.
///
/// # Errors
/// `NotDeletable` for any other kind of node, `DetachedNode` for the root.
pub fn delete_item(state: &mut EngineState, key: ContentKey, policy: &dyn GuardPolicy) -> Result<()> {
    let catalog = Arc::clone(&state.catalog);
    let node = state.store.get(key)?;
    let kind = node.kind();
    let (is_expression, is_executable) = (node.is_expression(), node.is_executable());
    let parent = state.store.parent_of(key)?;

    if is_expression {
        let argument = state.store.argument_mut(parent)?;
        argument.children.retain(|k| *k != key);
        let refill = !argument.multiple && argument.children.is_empty();
        let evicted = state.store.recursive_delete(key)?;

        if refill {
            let value = push_default_value(&mut state.store, parent)?;
            validate_value(&mut state.store, &catalog, value)?;
        }
        propagate_argument(&mut state.store, &catalog, parent)?;
        clear_selection(state, &evicted);
    } else if is_executable {
        let produced = produced_references(state, key)?;
        state.store.block_mut(parent)?.executables.retain(|k| *k != key);
        let evicted = state.store.recursive_delete(key)?;
        let evicted_set: HashSet<ContentKey> = evicted.iter().copied().collect();

        for reference in produced.into_iter().filter(|r| !evicted_set.contains(r)) {
            let value = replace_with_default_value(&mut state.store, reference)?;
            validate_value(&mut state.store, &catalog, value)?;
            propagate(&mut state.store, &catalog, value)?;
            if state.selection == Some(reference) {
                state.selection = Some(value);
            }
        }

        let references = affected_references(&state.store, parent)?;
        revalidate_references(&mut state.store, &references, policy)?;
        clear_selection(state, &evicted);
    } else {
        return Err(EngineError::NotDeletable { key, kind });
    }

    tracing::debug!(key = %key, kind = %kind, "item deleted");
    refresh_value_caches(&mut state.store, &catalog, state.root)
}

/// Build an executable from configuration and insert it into a Block
///
/// # Errors
/// `IndexOutOfRange` past the end of the block, plus construction errors.
pub fn insert_executable(
    state: &mut EngineState,
    block_key: ContentKey,
    index: usize,
    config: &ExecutableConfig,
    policy: &dyn GuardPolicy,
) -> Result<ContentKey> {
    let catalog = Arc::clone(&state.catalog);
    let key = build_executable(&mut state.store, &catalog, block_key, index, config)?;
    revalidate_subtree(&mut state.store, &catalog, key, policy)?;
    refresh_value_caches(&mut state.store, &catalog, state.root)?;
    Ok(key)
}

/// Re-parent an Action or Control to `index` within `block_key`
///
/// Every reference owned by the moved subtree and every reference to a
/// variable it produces is re-classified.
///
/// # Errors
/// * `NotAnExecutable` - `key` is not an Action or Control
/// * `InvalidMove` - target block lies inside the moved subtree
/// * `IndexOutOfRange` - `index` past the end of the target block
pub fn move_executable(
    state: &mut EngineState,
    key: ContentKey,
    block_key: ContentKey,
    index: usize,
    policy: &dyn GuardPolicy,
) -> Result<()> {
    let catalog = Arc::clone(&state.catalog);
    if !state.store.get(key)?.is_executable() {
        return Err(EngineError::NotAnExecutable { key });
    }
    let target_len = state.store.block(block_key)?.executables.len();
    if collect_down(&state.store, key, WalkOrder::Pre)?.contains(&block_key) {
        return Err(EngineError::InvalidMove {
            key,
            reason: format!("target block {} is inside the moved executable", block_key),
        });
    }

    let old_parent = state.store.parent_of(key)?;
    let len = if old_parent == block_key {
        target_len - 1
    } else {
        target_len
    };
    if index > len {
        return Err(EngineError::IndexOutOfRange {
            key: block_key,
            index,
            len,
        });
    }

    state.store.block_mut(old_parent)?.executables.retain(|k| *k != key);
    state.store.block_mut(block_key)?.executables.insert(index, key);
    state.store.set_parent(key, block_key)?;

    let references = affected_references(&state.store, key)?;
    revalidate_references(&mut state.store, &references, policy)?;
    refresh_value_caches(&mut state.store, &catalog, state.root)?;

    tracing::debug!(key = %key, block = %block_key, index, references = references.len(), "executable moved");
    Ok(())
}

/// Reposition one expression of a multi-valued Argument
///
/// Order inside an argument has no effect on types or reachability.
///
/// # Errors
/// `WrongNodeKind` for a non-argument, `NotAList` for a single-valued one,
/// `IndexOutOfRange` for bad indices.
pub fn reorder_input(state: &mut EngineState, argument_key: ContentKey, old_index: usize, new_index: usize) -> Result<()> {
    state.store.argument(argument_key)?;
    state.store.reorder(argument_key, old_index, new_index)
}

/// Reposition one executable within its Block
///
/// # Errors
/// `WrongNodeKind` for a non-block, `IndexOutOfRange` for bad indices.
pub fn reorder_list(
    state: &mut EngineState,
    block_key: ContentKey,
    old_index: usize,
    new_index: usize,
    policy: &dyn GuardPolicy,
) -> Result<()> {
    let catalog = Arc::clone(&state.catalog);
    state.store.block(block_key)?;
    state.store.reorder(block_key, old_index, new_index)?;

    let references = affected_references(&state.store, block_key)?;
    revalidate_references(&mut state.store, &references, policy)?;
    refresh_value_caches(&mut state.store, &catalog, state.root)
}

/// Rename a variable; references follow automatically since they link by key
///
/// # Errors
/// `WrongNodeKind` if `variable_key` is not a variable.
pub fn rename_variable(
    state: &mut EngineState,
    variable_key: ContentKey,
    name: String,
    policy: &dyn GuardPolicy,
) -> Result<()> {
    let variable = state.store.variable_mut(variable_key)?;
    variable.name = name;
    let references = variable.reference_keys.clone();
    revalidate_references(&mut state.store, &references, policy)
}

/// Select a node, or clear the selection
///
/// # Errors
/// `NodeNotFound` if the key is not in the store.
pub fn set_selection(state: &mut EngineState, key: Option<ContentKey>) -> Result<()> {
    if let Some(key) = key {
        state.store.get(key)?;
    }
    state.selection = key;
    Ok(())
}

/// References outside `key` reading a variable produced inside it
fn produced_references(state: &EngineState, key: ContentKey) -> Result<Vec<ContentKey>> {
    let mut out = Vec::new();
    for k in collect_down(&state.store, key, WalkOrder::Pre)? {
        if let Some(variable) = state.store.get(k)?.as_variable() {
            out.extend(variable.reference_keys.iter().copied());
        }
    }
    Ok(out)
}

fn clear_selection(state: &mut EngineState, evicted: &[ContentKey]) {
    if state.selection.is_some_and(|k| evicted.contains(&k)) {
        state.selection = None;
    }
}
