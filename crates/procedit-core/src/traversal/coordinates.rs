//! Positional addresses of nodes in the process tree
//!
//! A coordinate sequence collects, from the root down, the index of the
//! executable inside each enclosing Block and the index of the branch inside
//! each enclosing Control. Condition arguments contribute nothing, so a node
//! in a condition shares the Control's coordinates. The Process and its root
//! Block both sit at `[]`.

use crate::errors::{EngineError, Result};
use crate::model::{ContentKey, NodeKind};
use crate::ops::ContentStore;

use super::walk::ancestors;

pub type Coordinates = Vec<usize>;

/// Coordinates of any node, found by walking parent links to the root
///
/// # Errors
/// `NodeNotFound` for a missing key, `Internal` if a parent does not list
/// the child it was reached from.
pub fn coordinates_of(store: &ContentStore, key: ContentKey) -> Result<Coordinates> {
    let mut coords = Vec::new();
    let mut child = key;

    for parent in ancestors(store, key)? {
        match &store.get(parent)?.kind {
            NodeKind::Block(block) => {
                let index = position(&block.executables, child, parent)?;
                coords.push(index);
            }
            NodeKind::Control(control) => {
                if let Some(index) = control.blocks.iter().position(|k| *k == child) {
                    coords.push(index);
                }
            }
            _ => {}
        }
        child = parent;
    }

    coords.reverse();
    Ok(coords)
}

fn position(list: &[ContentKey], child: ContentKey, parent: ContentKey) -> Result<usize> {
    list.iter()
        .position(|k| *k == child)
        .ok_or_else(|| EngineError::Internal {
            message: format!("{} is not listed by its parent {}", child, parent),
        })
}

/// `a` executes no later than `b`
///
/// Compares the first differing component; when one sequence is a prefix of
/// the other the answer is `true`.
pub fn is_predecessor(a: &[usize], b: &[usize]) -> bool {
    match a.iter().zip(b).find(|(x, y)| x != y) {
        Some((x, y)) => x < y,
        None => true,
    }
}

/// Longest common prefix of two coordinate sequences
pub fn shared_ancestor(a: &[usize], b: &[usize]) -> Coordinates {
    a.iter()
        .zip(b)
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| *x)
        .collect()
}

/// Root Block of the process that owns `key`
///
/// # Errors
/// `Internal` if the chain does not end at a Process.
pub fn root_block_of(store: &ContentStore, key: ContentKey) -> Result<ContentKey> {
    let top = ancestors(store, key)?.last().copied().unwrap_or(key);
    match &store.get(top)?.kind {
        NodeKind::Process(process) => Ok(process.root_block),
        _ => Err(EngineError::Internal {
            message: format!("{} is not inside a process", key),
        }),
    }
}

/// Resolve a coordinate sequence to the Block or executable it addresses
///
/// Even-length sequences address Blocks, odd-length ones executables.
///
/// # Errors
/// `UnresolvedCoordinates` if any component is out of range or descends
/// through something other than a Block or Control.
pub fn node_at(store: &ContentStore, root_block: ContentKey, coords: &[usize]) -> Result<ContentKey> {
    let unresolved = || EngineError::UnresolvedCoordinates {
        coordinates: coords.to_vec(),
    };

    let mut current = root_block;
    for &index in coords {
        current = match &store.get(current)?.kind {
            NodeKind::Block(block) => *block.executables.get(index).ok_or_else(unresolved)?,
            NodeKind::Control(control) => *control.blocks.get(index).ok_or_else(unresolved)?,
            _ => return Err(unresolved()),
        };
    }
    Ok(current)
}
