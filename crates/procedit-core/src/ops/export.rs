//! Exporting the content tree back to a configuration document
//!
//! The structural inverse of construction. Defaults that construction
//! recreates on its own are left out: an argument holding only an empty
//! Value in a single-valued argument, and a multi-valued argument with no
//! children.

use std::collections::BTreeMap;

use crate::engine::Catalog;
use crate::errors::{EngineError, Result};
use crate::model::{
    ActionConfig, BlockConfig, ContentKey, ControlConfig, ExecutableConfig, ExpressionConfig,
    FunctionConfig, NodeKind, OutputConfig, ProcessConfig, ReferenceConfig, ValueConfig,
    ValueNode, RETURN_SLOT, STRING_TYPE,
};
use crate::traversal::coordinates_of;

use super::construct::CONDITION_SLOT;
use super::store::ContentStore;

/// Export the process rooted at `root`
///
/// # Errors
/// Lookup failures if the tree is inconsistent.
pub fn export(store: &ContentStore, catalog: &Catalog, root: ContentKey) -> Result<ProcessConfig> {
    let process = store.process(root)?;

    let return_expression = match process.slots.get(RETURN_SLOT) {
        Some(argument) => export_argument(store, catalog, *argument)?.and_then(|e| e.into_iter().next()),
        None => None,
    };

    Ok(ProcessConfig {
        name: process.name.clone(),
        root_block: export_block(store, catalog, process.root_block)?,
        return_expression,
        external_id: process.external_id.clone(),
    })
}

fn export_block(store: &ContentStore, catalog: &Catalog, key: ContentKey) -> Result<BlockConfig> {
    let executables = store
        .block(key)?
        .executables
        .iter()
        .map(|k| export_executable(store, catalog, *k))
        .collect::<Result<Vec<_>>>()?;
    Ok(BlockConfig { executables })
}

/// Export one Action or Control
///
/// # Errors
/// `NotAnExecutable` for any other kind of node.
pub fn export_executable(
    store: &ContentStore,
    catalog: &Catalog,
    key: ContentKey,
) -> Result<ExecutableConfig> {
    match &store.get(key)?.kind {
        NodeKind::Action(action) => {
            let output = match action.variable_key {
                Some(variable) => {
                    let variable = store.variable(variable)?;
                    Some(OutputConfig {
                        name: variable.name.clone(),
                        description: variable.description.clone(),
                    })
                }
                None => None,
            };
            Ok(ExecutableConfig::Action(ActionConfig {
                name: action.name.clone(),
                arguments: export_arguments(store, catalog, &action.arguments)?,
                output,
            }))
        }
        NodeKind::Control(control) => {
            let argument = control
                .arguments
                .get(CONDITION_SLOT)
                .ok_or_else(|| EngineError::Internal {
                    message: format!("control {} has no condition", key),
                })?;
            let condition = store
                .argument(*argument)?
                .children
                .first()
                .ok_or_else(|| EngineError::Internal {
                    message: format!("control {} has an empty condition", key),
                })?;
            Ok(ExecutableConfig::Control(ControlConfig {
                control_type: control.control_type,
                blocks: control
                    .blocks
                    .iter()
                    .map(|b| export_block(store, catalog, *b))
                    .collect::<Result<Vec<_>>>()?,
                condition: export_expression(store, catalog, *condition)?,
            }))
        }
        _ => Err(EngineError::NotAnExecutable { key }),
    }
}

fn export_arguments(
    store: &ContentStore,
    catalog: &Catalog,
    arguments: &BTreeMap<String, ContentKey>,
) -> Result<BTreeMap<String, Vec<ExpressionConfig>>> {
    let mut out = BTreeMap::new();
    for (name, key) in arguments {
        if let Some(expressions) = export_argument(store, catalog, *key)? {
            out.insert(name.clone(), expressions);
        }
    }
    Ok(out)
}

/// Expressions of one argument, or `None` when it only holds defaults
fn export_argument(
    store: &ContentStore,
    catalog: &Catalog,
    key: ContentKey,
) -> Result<Option<Vec<ExpressionConfig>>> {
    let argument = store.argument(key)?;
    let children = &argument.children;
    let only_default = match children.as_slice() {
        [] => true,
        [single] if !argument.multiple => {
            store.get(*single)?.as_value().is_some_and(|v| v.value.is_empty())
        }
        _ => false,
    };
    if only_default {
        return Ok(None);
    }

    children
        .iter()
        .map(|k| export_expression(store, catalog, *k))
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

/// Export one Value, Function or Reference
///
/// # Errors
/// `WrongNodeKind`-style failures for non-expressions.
pub fn export_expression(
    store: &ContentStore,
    catalog: &Catalog,
    key: ContentKey,
) -> Result<ExpressionConfig> {
    match &store.get(key)?.kind {
        NodeKind::Value(value) => Ok(ExpressionConfig::Value(ValueConfig {
            value: value.value.clone(),
            type_id: literal_type(value, catalog),
        })),
        NodeKind::Function(function) => Ok(ExpressionConfig::Function(FunctionConfig {
            name: function.name.clone(),
            arguments: export_arguments(store, catalog, &function.arguments)?,
        })),
        NodeKind::Reference(reference) => {
            let variable = store.variable(reference.variable_key)?;
            let producer = store.parent_of(reference.variable_key)?;
            let (coordinates, path) = match &store.get(producer)?.kind {
                NodeKind::Process(_) => {
                    let mut path = vec![variable.name.clone()];
                    path.extend(reference.path.iter().cloned());
                    (Vec::new(), path)
                }
                _ => (coordinates_of(store, producer)?, reference.path.clone()),
            };
            Ok(ExpressionConfig::Reference(ReferenceConfig { coordinates, path }))
        }
        _ => Err(EngineError::Internal {
            message: format!("{} is not an expression", key),
        }),
    }
}

/// First member of the value's type that accepts its literal
fn literal_type(value: &ValueNode, catalog: &Catalog) -> String {
    value
        .type_id
        .iter()
        .find(|t| catalog.literals().accepts(&value.value, t, catalog.spec()))
        .or_else(|| value.type_id.first())
        .cloned()
        .unwrap_or_else(|| STRING_TYPE.to_string())
}
