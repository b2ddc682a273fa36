//! Type compatibility checks and upward type propagation
//!
//! An Argument's calculated type is the union of its children's types. When
//! that fails the declared requirement, the owning callable gets a blocking
//! `UNSATISFIED_INPUT_TYPE_MISMATCH` and propagation stops there. When it
//! passes and the parameter propagates, the owner's output type follows the
//! argument: a Function passes it on to its own Argument, an Action to its
//! output Variable and from there to every Reference reading it.

use procedit_core_types::TypeUnion;

use crate::engine::Catalog;
use crate::errors::{EngineError, Result};
use crate::model::{ContentKey, ContentKind, NodeKind, ValidationCode, ValidationError};
use crate::ops::ContentStore;
use crate::types::{matches_requirement, resolve_path, ResolvedPath};

/// Parameter tag of errors raised when a reference path stops resolving
pub const PATH_PARAMETER: &str = "path";

/// Hard limit on propagation steps triggered by one edit
const MAX_STEPS: usize = 1_000;

/// Re-propagate from an expression's position
///
/// No-op for expressions that are not held by an Argument.
///
/// # Errors
/// Lookup failures on an inconsistent tree.
pub fn propagate(store: &mut ContentStore, catalog: &Catalog, expression_key: ContentKey) -> Result<()> {
    let parent = store.parent_of(expression_key)?;
    if store.get(parent)?.kind() == ContentKind::Argument {
        propagate_argument(store, catalog, parent)?;
    }
    Ok(())
}

/// Recompute one Argument and push any change upwards
///
/// # Errors
/// Lookup failures on an inconsistent tree, `Internal` if the change has not
/// settled after `MAX_STEPS` steps.
pub fn propagate_argument(store: &mut ContentStore, catalog: &Catalog, argument_key: ContentKey) -> Result<()> {
    propagate_within(store, catalog, argument_key, MAX_STEPS)
}

fn propagate_within(
    store: &mut ContentStore,
    catalog: &Catalog,
    argument_key: ContentKey,
    max_steps: usize,
) -> Result<()> {
    let mut pending = vec![argument_key];
    let mut steps = 0;

    while let Some(key) = pending.pop() {
        steps += 1;
        if steps > max_steps {
            tracing::warn!(argument = %argument_key, "type propagation did not settle");
            return Err(EngineError::Internal {
                message: format!(
                    "type propagation from {} did not settle after {} steps",
                    argument_key, max_steps
                ),
            });
        }
        pending.extend(step(store, catalog, key)?);
    }
    Ok(())
}

/// One propagation step; returns the arguments that need recomputing next
fn step(store: &mut ContentStore, catalog: &Catalog, argument_key: ContentKey) -> Result<Vec<ContentKey>> {
    let argument = store.argument(argument_key)?;
    let children = argument.children.clone();

    let mut calculated = TypeUnion::empty();
    let mut calculated_multiple = children.len() > 1;
    for child in &children {
        let (type_id, multiple) = store
            .get(*child)?
            .expression_type()
            .ok_or(EngineError::Internal {
                message: format!("{} holds a non-expression child {}", argument_key, child),
            })?;
        calculated = calculated.union(type_id);
        calculated_multiple |= multiple;
    }

    let argument = store.argument_mut(argument_key)?;
    argument.calculated_type = calculated.clone();
    argument.calculated_multiple = calculated_multiple;
    let name = argument.name.clone();
    let propagates = argument.propagates;
    let type_ok = matches_requirement(&calculated, &argument.allowed_type, catalog.types());
    let multiplicity_ok = argument.multiple || !calculated_multiple;
    let declared = argument.declared_type.clone();

    let owner_key = store.parent_of(argument_key)?;
    let owner = store.get_mut(owner_key)?;

    if !type_ok || !multiplicity_ok {
        let message = if type_ok {
            format!("Input '{}' accepts a single value", name)
        } else {
            format!("Input '{}' expects {}, got {}", name, declared, calculated)
        };
        owner.set_error(ValidationError::for_parameter(
            ValidationCode::UnsatisfiedInputTypeMismatch,
            name.as_str(),
            message,
        ));
        tracing::debug!(argument = %argument_key, parameter = %name, "input type mismatch");
        return Ok(Vec::new());
    }
    owner.clear_errors(ValidationCode::UnsatisfiedInputTypeMismatch, Some(&name));

    if !propagates {
        return Ok(Vec::new());
    }

    match &mut owner.kind {
        NodeKind::Function(function) => {
            if function.output_type == calculated && function.output_multiple == calculated_multiple {
                return Ok(Vec::new());
            }
            function.output_type = calculated;
            function.output_multiple = calculated_multiple;
            let parent = store.parent_of(owner_key)?;
            Ok(match store.get(parent)?.kind() {
                ContentKind::Argument => vec![parent],
                _ => Vec::new(),
            })
        }
        NodeKind::Action(action) => {
            action.output_type = calculated.clone();
            action.output_multiple = calculated_multiple;
            let Some(variable_key) = action.variable_key else {
                return Ok(Vec::new());
            };
            let variable = store.variable_mut(variable_key)?;
            if variable.type_id == calculated && variable.multiple == calculated_multiple {
                return Ok(Vec::new());
            }
            variable.type_id = calculated;
            variable.multiple = calculated_multiple;
            let references = variable.reference_keys.clone();

            let mut next = Vec::new();
            for reference in references {
                refresh_reference_type(store, catalog, reference)?;
                let parent = store.parent_of(reference)?;
                if store.get(parent)?.kind() == ContentKind::Argument {
                    next.push(parent);
                }
            }
            tracing::debug!(variable = %variable_key, next = next.len(), "variable type changed");
            Ok(next)
        }
        _ => Ok(Vec::new()),
    }
}

/// Recompute a reference's type by walking its path from the variable
///
/// A path that no longer resolves leaves the reference untyped with a
/// blocking `INVALID_REFERENCE`.
///
/// # Errors
/// Lookup failures on an inconsistent tree.
pub fn refresh_reference_type(store: &mut ContentStore, catalog: &Catalog, reference_key: ContentKey) -> Result<()> {
    let reference = store.reference(reference_key)?;
    let path = reference.path.clone();
    let start = match store.variable(reference.variable_key) {
        Ok(variable) => ResolvedPath {
            type_id: variable.type_id.clone(),
            multiple: variable.multiple,
            optional: variable.optional,
        },
        Err(_) => ResolvedPath {
            type_id: TypeUnion::empty(),
            multiple: false,
            optional: false,
        },
    };

    let resolved = resolve_path(start, &path, catalog.spec(), catalog.types());
    let node = store.get_mut(reference_key)?;
    node.clear_errors(ValidationCode::InvalidReference, Some(PATH_PARAMETER));

    let resolved = match resolved {
        Ok(resolved) => resolved,
        Err(_) => {
            node.set_error(ValidationError::for_parameter(
                ValidationCode::InvalidReference,
                PATH_PARAMETER,
                format!("Property path '{}' does not resolve", path.join(".")),
            ));
            ResolvedPath {
                type_id: TypeUnion::empty(),
                multiple: false,
                optional: false,
            }
        }
    };

    if let Some(reference) = node.as_reference_mut() {
        reference.type_id = resolved.type_id;
        reference.multiple = resolved.multiple;
        reference.optional = resolved.optional;
    }
    Ok(())
}
