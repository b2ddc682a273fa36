//! Reference reachability
//!
//! Decides from coordinates alone whether a variable produced at one
//! position can be read at another:
//!
//! - UNREACHABLE: the producer does not execute before the use, or the two
//!   only meet at a Control (one of them sits in its condition, or they are
//!   in different branches)
//! - OPTIONAL: the producer sits in a branch nested below the shared Block
//! - VALID: otherwise

use crate::errors::Result;
use crate::model::{ContentKey, ContentKind, Reachability, ValidationCode, ValidationError};
use crate::ops::ContentStore;
use crate::policy::GuardPolicy;
use crate::traversal::{coordinates_of, is_predecessor, node_at, root_block_of, shared_ancestor};

/// Parameter tag of errors raised by the position check
pub const POSITION_PARAMETER: &str = "position";

/// Classify a read at `use_key` of a variable produced by `producer`
///
/// # Errors
/// Lookup failures while computing coordinates.
pub fn classify(store: &ContentStore, producer: ContentKey, use_key: ContentKey) -> Result<Reachability> {
    let producer_coords = coordinates_of(store, producer)?;
    let use_coords = coordinates_of(store, use_key)?;

    if !is_predecessor(&producer_coords, &use_coords) {
        return Ok(Reachability::Unreachable);
    }

    let shared = shared_ancestor(&producer_coords, &use_coords);
    let root_block = root_block_of(store, use_key)?;
    let meeting_point = node_at(store, root_block, &shared)?;
    if store.get(meeting_point)?.kind() != ContentKind::Block {
        return Ok(Reachability::Unreachable);
    }

    if shared.len() + 1 < producer_coords.len() {
        return Ok(Reachability::Optional);
    }
    Ok(Reachability::Valid)
}

/// Classify a read of `variable_key` at `use_key`
///
/// A variable whose producer is gone is unreachable everywhere.
///
/// # Errors
/// Lookup failures while computing coordinates.
pub fn classify_variable(
    store: &ContentStore,
    variable_key: ContentKey,
    use_key: ContentKey,
) -> Result<Reachability> {
    match store.get(variable_key).ok().and_then(|v| v.parent_key) {
        Some(producer) if store.contains(producer) => classify(store, producer, use_key),
        _ => Ok(Reachability::Unreachable),
    }
}

/// Re-classify a reference and record the verdict on it
///
/// UNREACHABLE attaches a blocking `INVALID_REFERENCE`; OPTIONAL attaches the
/// non-blocking `UNCHECKED_REFERENCE` unless the policy reports a guard.
///
/// # Errors
/// `NodeNotFound`/`WrongNodeKind` if `reference_key` is not a reference.
pub fn validate_reference(
    store: &mut ContentStore,
    reference_key: ContentKey,
    policy: &dyn GuardPolicy,
) -> Result<Reachability> {
    let variable_key = store.reference(reference_key)?.variable_key;
    let verdict = classify_variable(store, variable_key, reference_key)?;
    let variable_name = store
        .variable(variable_key)
        .map(|v| v.name.clone())
        .unwrap_or_default();

    let node = store.get_mut(reference_key)?;
    if let Some(reference) = node.as_reference_mut() {
        reference.reachability = verdict;
    }
    node.clear_errors(ValidationCode::InvalidReference, Some(POSITION_PARAMETER));
    node.clear_errors(ValidationCode::UncheckedReference, Some(POSITION_PARAMETER));

    match verdict {
        Reachability::Unreachable => node.set_error(ValidationError::for_parameter(
            ValidationCode::InvalidReference,
            POSITION_PARAMETER,
            format!("Variable '{}' is not available at this position", variable_name),
        )),
        Reachability::Optional if !policy.is_guarded(reference_key, &variable_name) => {
            node.set_error(ValidationError::for_parameter(
                ValidationCode::UncheckedReference,
                POSITION_PARAMETER,
                format!("Variable '{}' may not have been set at this position", variable_name),
            ))
        }
        Reachability::Optional | Reachability::Valid => {}
    }

    tracing::debug!(reference = %reference_key, verdict = ?verdict, "reference classified");
    Ok(verdict)
}
