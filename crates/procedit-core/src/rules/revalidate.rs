//! Revalidation passes composed from the individual rules
//!
//! Editing operations call the narrowest pass that covers what they touched;
//! construction runs the full pass once.

use procedit_core_types::TypeUnion;

use crate::engine::Catalog;
use crate::errors::Result;
use crate::model::{ContentKey, ContentKind, NodeKind, Reachability, ValidationCode};
use crate::ops::ContentStore;
use crate::policy::GuardPolicy;
use crate::traversal::{collect_down, WalkOrder};
use crate::types::matches_requirement;

use super::propagation::{propagate_argument, refresh_reference_type};
use super::reachability::{classify_variable, validate_reference};

/// Re-run literal validation on one Value
///
/// Required-ness comes from the Argument holding the value.
///
/// # Errors
/// `NodeNotFound`/`WrongNodeKind` if `value_key` is not a value.
pub fn validate_value(store: &mut ContentStore, catalog: &Catalog, value_key: ContentKey) -> Result<()> {
    let value = store.value(value_key)?;
    let text = value.value.clone();
    let type_id = value.type_id.clone();
    let required = store
        .get(value_key)?
        .parent_key
        .and_then(|p| store.argument(p).ok())
        .is_some_and(|a| a.required);

    let errors = catalog
        .literals()
        .validate(&text, &type_id, required, catalog.spec());

    let node = store.get_mut(value_key)?;
    node.clear_errors(ValidationCode::MissingOrInvalidValue, None);
    node.clear_errors(ValidationCode::NoLiteralForm, None);
    node.errors.extend(errors);
    Ok(())
}

/// Full revalidation of everything below (and including) `key`
///
/// Reference types are refreshed first, then arguments are recomputed
/// bottom-up, then literals and reference positions are checked.
///
/// # Errors
/// Lookup failures on an inconsistent tree.
pub fn revalidate_subtree(
    store: &mut ContentStore,
    catalog: &Catalog,
    key: ContentKey,
    policy: &dyn GuardPolicy,
) -> Result<()> {
    let keys = collect_down(store, key, WalkOrder::Post)?;
    let of_kind = |store: &ContentStore, kind: ContentKind| -> Vec<ContentKey> {
        keys.iter()
            .copied()
            .filter(|k| store.get(*k).is_ok_and(|n| n.kind() == kind))
            .collect()
    };
    let references = of_kind(&*store, ContentKind::Reference);
    let arguments = of_kind(&*store, ContentKind::Argument);
    let values = of_kind(&*store, ContentKind::Value);

    for reference in &references {
        refresh_reference_type(store, catalog, *reference)?;
    }
    for argument in arguments {
        propagate_argument(store, catalog, argument)?;
    }
    for value in values {
        validate_value(store, catalog, value)?;
    }
    for reference in references {
        validate_reference(store, reference, policy)?;
    }
    Ok(())
}

/// Full pass over a whole process tree, including value caches
///
/// # Errors
/// Lookup failures on an inconsistent tree.
pub fn revalidate_all(
    store: &mut ContentStore,
    catalog: &Catalog,
    root: ContentKey,
    policy: &dyn GuardPolicy,
) -> Result<()> {
    revalidate_subtree(store, catalog, root, policy)?;
    refresh_value_caches(store, catalog, root)?;
    tracing::debug!(root = %root, "full revalidation");
    Ok(())
}

/// References whose verdict can change when `key` moves
///
/// Every reference owned by the subtree plus every reference reading a
/// variable the subtree produces.
///
/// # Errors
/// Lookup failures on an inconsistent tree.
pub fn affected_references(store: &ContentStore, key: ContentKey) -> Result<Vec<ContentKey>> {
    let mut out = Vec::new();
    for k in collect_down(store, key, WalkOrder::Pre)? {
        match &store.get(k)?.kind {
            NodeKind::Reference(_) => out.push(k),
            NodeKind::Variable(variable) => out.extend(variable.reference_keys.iter().copied()),
            _ => {}
        }
    }
    out.sort();
    out.dedup();
    Ok(out)
}

/// Re-classify a set of references
///
/// # Errors
/// Lookup failures on an inconsistent tree.
pub fn revalidate_references(
    store: &mut ContentStore,
    references: &[ContentKey],
    policy: &dyn GuardPolicy,
) -> Result<()> {
    for reference in references {
        if store.contains(*reference) {
            validate_reference(store, *reference, policy)?;
        }
    }
    Ok(())
}

/// Functions whose declared output satisfies `allowed`
pub fn assignable_functions(catalog: &Catalog, allowed: &TypeUnion) -> Vec<String> {
    catalog
        .spec()
        .functions
        .iter()
        .filter(|(_, f)| {
            f.output
                .as_ref()
                .is_some_and(|o| matches_requirement(&o.type_id, allowed, catalog.types()))
        })
        .map(|(name, _)| name.clone())
        .collect()
}

/// Variables readable at `position` whose type satisfies `allowed`
///
/// # Errors
/// Lookup failures while computing coordinates.
pub fn assignable_variables(
    store: &ContentStore,
    catalog: &Catalog,
    position: ContentKey,
    allowed: &TypeUnion,
) -> Result<Vec<ContentKey>> {
    let mut out = Vec::new();
    for key in store.keys() {
        let Some(variable) = store.get(key)?.as_variable() else {
            continue;
        };
        if !matches_requirement(&variable.type_id, allowed, catalog.types()) {
            continue;
        }
        if classify_variable(store, key, position)? != Reachability::Unreachable {
            out.push(key);
        }
    }
    Ok(out)
}

/// Recompute the assignable functions and variables of every Value
///
/// # Errors
/// Lookup failures on an inconsistent tree.
pub fn refresh_value_caches(store: &mut ContentStore, catalog: &Catalog, root: ContentKey) -> Result<()> {
    let values: Vec<ContentKey> = collect_down(store, root, WalkOrder::Pre)?
        .into_iter()
        .filter(|k| store.get(*k).is_ok_and(|n| n.kind() == ContentKind::Value))
        .collect();

    for value_key in values {
        let allowed = match store.parent_of(value_key).and_then(|p| store.argument(p)) {
            Ok(argument) => argument.allowed_type.clone(),
            Err(_) => continue,
        };
        let function_ids = assignable_functions(catalog, &allowed);
        let variable_keys = assignable_variables(store, catalog, value_key, &allowed)?;

        let value = store.value_mut(value_key)?;
        value.function_ids = function_ids;
        value.variable_keys = variable_keys;
    }
    Ok(())
}
