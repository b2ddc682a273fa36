//! Tree walks over the content store
//!
//! Both directions use explicit worklists. Upward walks carry a depth guard
//! so a corrupted parent chain fails instead of looping.

use crate::errors::{EngineError, Result};
use crate::model::{ContentKey, ContentNode};
use crate::ops::ContentStore;

/// Upper bound on parent-chain length
pub const MAX_DEPTH: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOrder {
    /// Parent before children
    Pre,
    /// Children before parent
    Post,
}

/// Visit `root` and everything it owns, children in canonical order
///
/// # Errors
/// `NodeNotFound` if any key on the way is missing.
pub fn walk_down<F>(store: &ContentStore, root: ContentKey, order: WalkOrder, mut visit: F) -> Result<()>
where
    F: FnMut(&ContentNode),
{
    for key in collect_down(store, root, order)? {
        visit(store.get(key)?);
    }
    Ok(())
}

/// Keys of `root` and everything it owns, in the requested order
///
/// # Errors
/// `NodeNotFound` if any key on the way is missing.
pub fn collect_down(store: &ContentStore, root: ContentKey, order: WalkOrder) -> Result<Vec<ContentKey>> {
    let mut out = Vec::new();
    // (key, children already pushed)
    let mut stack = vec![(root, false)];

    while let Some((key, expanded)) = stack.pop() {
        let node = store.get(key)?;
        match order {
            WalkOrder::Pre => {
                out.push(key);
                stack.extend(node.children().into_iter().rev().map(|k| (k, false)));
            }
            WalkOrder::Post if expanded => out.push(key),
            WalkOrder::Post => {
                stack.push((key, true));
                stack.extend(node.children().into_iter().rev().map(|k| (k, false)));
            }
        }
    }

    Ok(out)
}

/// Parent chain of `key`, nearest first, excluding `key` itself
///
/// # Errors
/// `NodeNotFound` for a missing key, `Internal` if the chain exceeds `MAX_DEPTH`.
pub fn ancestors(store: &ContentStore, key: ContentKey) -> Result<Vec<ContentKey>> {
    let mut out = Vec::new();
    let mut current = store.get(key)?.parent_key;

    while let Some(parent) = current {
        if out.len() >= MAX_DEPTH {
            return Err(EngineError::Internal {
                message: format!("parent chain of {} exceeds {} levels", key, MAX_DEPTH),
            });
        }
        out.push(parent);
        current = store.get(parent)?.parent_key;
    }

    Ok(out)
}
