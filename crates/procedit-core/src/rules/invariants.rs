//! Structural invariants of the content store
//!
//! Editing operations keep these by construction; the checks exist for
//! tests and for `check_tree`, which callers can run after bulk edits.

use std::collections::HashSet;

use crate::errors::{EngineError, Result};
use crate::model::{ContentKey, NodeKind};
use crate::ops::ContentStore;

/// Keys in the arena that cannot be reached from `root`
pub fn find_dangling_keys(store: &ContentStore, root: ContentKey) -> Vec<ContentKey> {
    let reachable: HashSet<ContentKey> = store.reachable_from(root).into_iter().collect();
    store
        .keys()
        .into_iter()
        .filter(|k| !reachable.contains(k))
        .collect()
}

/// Children whose `parent_key` does not name the node listing them
///
/// Returns list of (child, listed_by) tuples
pub fn find_parent_mismatches(store: &ContentStore) -> Vec<(ContentKey, ContentKey)> {
    let mut mismatches = Vec::new();
    for key in store.keys() {
        let Ok(node) = store.get(key) else { continue };
        for child in node.children() {
            let parent = store.get(child).ok().and_then(|c| c.parent_key);
            if parent != Some(key) {
                mismatches.push((child, key));
            }
        }
    }
    mismatches
}

/// Single-valued arguments that do not hold exactly one expression
pub fn find_arity_violations(store: &ContentStore) -> Vec<ContentKey> {
    store
        .keys()
        .into_iter()
        .filter(|k| {
            store
                .argument(*k)
                .is_ok_and(|a| !a.multiple && a.children.len() != 1)
        })
        .collect()
}

/// Children of the wrong kind for their slot
///
/// Arguments must hold expressions, Blocks executables.
pub fn find_misplaced_children(store: &ContentStore) -> Vec<(ContentKey, ContentKey)> {
    let mut misplaced = Vec::new();
    for key in store.keys() {
        let Ok(node) = store.get(key) else { continue };
        let (children, expect_expression) = match &node.kind {
            NodeKind::Argument(a) => (&a.children, true),
            NodeKind::Block(b) => (&b.executables, false),
            _ => continue,
        };
        for child in children {
            let ok = store.get(*child).is_ok_and(|c| {
                if expect_expression {
                    c.is_expression()
                } else {
                    c.is_executable()
                }
            });
            if !ok {
                misplaced.push((*child, key));
            }
        }
    }
    misplaced
}

/// References and variables whose back-links disagree
///
/// Returns list of (reference, variable) tuples
pub fn find_broken_back_references(store: &ContentStore) -> Vec<(ContentKey, ContentKey)> {
    let mut broken = Vec::new();
    for key in store.keys() {
        let Ok(node) = store.get(key) else { continue };
        match &node.kind {
            NodeKind::Reference(reference) => {
                let listed = store
                    .variable(reference.variable_key)
                    .is_ok_and(|v| v.reference_keys.contains(&key));
                if !listed {
                    broken.push((key, reference.variable_key));
                }
            }
            NodeKind::Variable(variable) => {
                for reference in &variable.reference_keys {
                    let points_back = store
                        .reference(*reference)
                        .is_ok_and(|r| r.variable_key == key);
                    if !points_back {
                        broken.push((*reference, key));
                    }
                }
            }
            _ => {}
        }
    }
    broken
}

/// Run every structural check and fail on the first violation
///
/// # Errors
/// `Internal` describing the first violation found.
pub fn check_tree(store: &ContentStore, root: ContentKey) -> Result<()> {
    let internal = |message: String| Err(EngineError::Internal { message });

    if let Some(key) = find_dangling_keys(store, root).first() {
        return internal(format!("{} is not reachable from {}", key, root));
    }
    if let Some((child, parent)) = find_parent_mismatches(store).first() {
        return internal(format!("{} is listed by {} but not parented to it", child, parent));
    }
    if let Some(key) = find_arity_violations(store).first() {
        return internal(format!("single-valued argument {} does not hold exactly one child", key));
    }
    if let Some((child, parent)) = find_misplaced_children(store).first() {
        return internal(format!("{} has the wrong kind for its slot in {}", child, parent));
    }
    if let Some((reference, variable)) = find_broken_back_references(store).first() {
        return internal(format!("{} and {} disagree about their link", reference, variable));
    }
    Ok(())
}
