//! Building content nodes from configuration documents
//!
//! Construction is two-phase. The tree is built top-down, each child
//! receiving its parent's key before it is linked into the parent. References
//! address their producer by coordinates, which only mean something once the
//! tree around them exists, so they are collected while building and resolved
//! afterwards.

use procedit_core_types::TypeUnion;
use std::collections::BTreeMap;

use crate::engine::Catalog;
use crate::errors::{EngineError, Result};
use crate::model::{
    ActionConfig, ActionNode, ArgumentNode, BlockConfig, BlockNode, ContentKey, ContentKind,
    ControlConfig, ControlNode, ExecutableConfig, ExpressionConfig, FunctionConfig, FunctionNode,
    NodeKind, ParameterSpec, ProcessConfig, ProcessNode, Reachability, ReferenceConfig,
    ReferenceNode, ValueNode, VariableNode, BOOLEAN_TYPE, OBJECT_TYPE, RETURN_SLOT, STRING_TYPE,
};
use crate::traversal::{node_at, root_block_of};
use crate::types::expand;

use super::store::ContentStore;

/// Name of a conditional's condition argument
pub const CONDITION_SLOT: &str = "condition";

/// Type of a freshly created Value: the declared type with the top object
/// type replaced by its string representation
pub fn default_value_type(declared: &TypeUnion) -> TypeUnion {
    declared
        .iter()
        .map(|t| if t == OBJECT_TYPE { STRING_TYPE } else { t.as_str() })
        .collect()
}

/// Parameter description of a conditional's condition
pub fn condition_parameter() -> ParameterSpec {
    ParameterSpec {
        required: true,
        ..ParameterSpec::new(BOOLEAN_TYPE)
    }
}

/// Build a complete process tree and return the Process key
///
/// # Errors
/// * `UnknownProcess` / `UnknownAction` / `UnknownFunction` - name not in the catalog
/// * `UnknownParameter` - argument not declared by its callable
/// * `NotMultiValued` - several expressions for a single-valued parameter
/// * `MissingOutput` - output bound on an action that declares none
/// * `UnresolvedCoordinates` / `UnknownInput` - reference with no producer
pub fn construct(store: &mut ContentStore, catalog: &Catalog, config: &ProcessConfig) -> Result<ContentKey> {
    let spec = catalog
        .spec()
        .process(&config.name)
        .ok_or_else(|| EngineError::UnknownProcess {
            name: config.name.clone(),
        })?;

    let mut builder = Builder::new(store, catalog);

    let root_block = builder.store.insert(None, NodeKind::Block(BlockNode::default()));
    let process = builder.store.insert(
        None,
        NodeKind::Process(ProcessNode {
            name: config.name.clone(),
            external_id: config.external_id.clone(),
            inputs: Vec::new(),
            slots: BTreeMap::new(),
            root_block,
        }),
    );
    builder.store.set_parent(root_block, process)?;

    let mut inputs = Vec::new();
    for (name, param) in &spec.inputs {
        let variable = builder.store.insert(
            Some(process),
            NodeKind::Variable(VariableNode {
                name: name.clone(),
                type_id: param.type_id.clone(),
                multiple: param.multiple,
                optional: !param.required,
                title: param.metadata.get("title").and_then(|t| t.as_str()).map(String::from),
                description: None,
                reference_keys: Vec::new(),
            }),
        );
        inputs.push(variable);
    }

    let mut slots = BTreeMap::new();
    match (&spec.output, &config.return_expression) {
        (Some(output), expression) => {
            let param = ParameterSpec {
                multiple: output.multiple,
                required: !output.optional,
                ..ParameterSpec::new(output.type_id.clone())
            };
            let expressions: Vec<ExpressionConfig> = expression.iter().cloned().collect();
            let argument = builder.argument(process, RETURN_SLOT, &param, &expressions)?;
            slots.insert(RETURN_SLOT.to_string(), argument);
        }
        (None, Some(_)) => {
            return Err(EngineError::UnknownParameter {
                callable: config.name.clone(),
                parameter: RETURN_SLOT.to_string(),
            })
        }
        (None, None) => {}
    }

    let executables = builder.executables(root_block, &config.root_block)?;
    builder.store.block_mut(root_block)?.executables = executables;

    let node = builder.store.process_mut(process)?;
    node.inputs = inputs;
    node.slots = slots;

    builder.resolve_references(process)?;
    tracing::debug!(process = %config.name, nodes = store.len(), "process constructed");
    Ok(process)
}

/// Substitute an expression subtree in place
///
/// The new expression takes the old one's slot in its Argument; the old
/// subtree is then deleted.
///
/// # Errors
/// `WrongNodeKind` if `key` is not held by an Argument, plus any construction error.
pub fn replace(
    store: &mut ContentStore,
    catalog: &Catalog,
    key: ContentKey,
    config: &ExpressionConfig,
) -> Result<ContentKey> {
    let parent = store.parent_of(key)?;
    store.argument(parent)?;
    if !store.get(key)?.is_expression() {
        return Err(EngineError::WrongNodeKind {
            key,
            expected: ContentKind::Value,
            actual: store.get(key)?.kind(),
        });
    }
    let root_block = root_block_of(store, key)?;

    let mut builder = Builder::new(store, catalog);
    let new_key = builder.expression(parent, config)?;
    builder.store.replace_child(parent, key, new_key)?;
    builder.store.recursive_delete(key)?;
    builder.resolve_references_from(root_block)?;

    tracing::debug!(old = %key, new = %new_key, "expression replaced");
    Ok(new_key)
}

/// Build an executable and link it into `block_key` at `index`
///
/// # Errors
/// `IndexOutOfRange` if `index` exceeds the block length, plus any
/// construction error.
pub fn insert_executable(
    store: &mut ContentStore,
    catalog: &Catalog,
    block_key: ContentKey,
    index: usize,
    config: &ExecutableConfig,
) -> Result<ContentKey> {
    let len = store.block(block_key)?.executables.len();
    if index > len {
        return Err(EngineError::IndexOutOfRange {
            key: block_key,
            index,
            len,
        });
    }
    let root_block = root_block_of(store, block_key)?;

    let mut builder = Builder::new(store, catalog);
    let key = builder.executable(block_key, config)?;
    builder.store.block_mut(block_key)?.executables.insert(index, key);
    builder.resolve_references_from(root_block)?;
    Ok(key)
}

/// Append a fresh empty Value to an Argument
///
/// # Errors
/// `WrongNodeKind` if `argument_key` is not an argument.
pub fn push_default_value(store: &mut ContentStore, argument_key: ContentKey) -> Result<ContentKey> {
    let type_id = default_value_type(&store.argument(argument_key)?.declared_type);
    let value = store.insert(Some(argument_key), NodeKind::Value(empty_value(type_id)));
    store.argument_mut(argument_key)?.children.push(value);
    Ok(value)
}

/// Swap an expression for a fresh empty Value in the same slot
///
/// # Errors
/// `WrongNodeKind` if `key` is not held by an Argument.
pub fn replace_with_default_value(store: &mut ContentStore, key: ContentKey) -> Result<ContentKey> {
    let parent = store.parent_of(key)?;
    let type_id = default_value_type(&store.argument(parent)?.declared_type);
    let value = store.insert(Some(parent), NodeKind::Value(empty_value(type_id)));
    store.replace_child(parent, key, value)?;
    store.recursive_delete(key)?;
    Ok(value)
}

fn empty_value(type_id: TypeUnion) -> ValueNode {
    ValueNode {
        value: String::new(),
        type_id,
        function_ids: Vec::new(),
        variable_keys: Vec::new(),
    }
}

struct Builder<'a> {
    store: &'a mut ContentStore,
    catalog: &'a Catalog,
    /// References waiting for their producer to be resolved
    pending: Vec<(ContentKey, ReferenceConfig)>,
}

impl<'a> Builder<'a> {
    fn new(store: &'a mut ContentStore, catalog: &'a Catalog) -> Self {
        Self {
            store,
            catalog,
            pending: Vec::new(),
        }
    }

    fn block(&mut self, parent: ContentKey, config: &BlockConfig) -> Result<ContentKey> {
        let block = self
            .store
            .insert(Some(parent), NodeKind::Block(BlockNode::default()));
        let executables = self.executables(block, config)?;
        self.store.block_mut(block)?.executables = executables;
        Ok(block)
    }

    fn executables(&mut self, block: ContentKey, config: &BlockConfig) -> Result<Vec<ContentKey>> {
        config
            .executables
            .iter()
            .map(|executable| self.executable(block, executable))
            .collect()
    }

    fn executable(&mut self, parent: ContentKey, config: &ExecutableConfig) -> Result<ContentKey> {
        match config {
            ExecutableConfig::Action(action) => self.action(parent, action),
            ExecutableConfig::Control(control) => self.control(parent, control),
        }
    }

    fn action(&mut self, parent: ContentKey, config: &ActionConfig) -> Result<ContentKey> {
        let spec = self
            .catalog
            .spec()
            .action(&config.name)
            .ok_or_else(|| EngineError::UnknownAction {
                name: config.name.clone(),
            })?;

        let (output_type, output_multiple) = spec
            .output
            .as_ref()
            .map(|o| (o.type_id.clone(), o.multiple))
            .unwrap_or_default();
        let action = self.store.insert(
            Some(parent),
            NodeKind::Action(ActionNode {
                name: config.name.clone(),
                output_type,
                output_multiple,
                arguments: BTreeMap::new(),
                variable_key: None,
            }),
        );

        let arguments = self.arguments(action, &config.name, &spec.inputs, &config.arguments)?;

        let variable_key = match &config.output {
            None => None,
            Some(binding) => {
                let output = spec.output.as_ref().ok_or_else(|| EngineError::MissingOutput {
                    callable: config.name.clone(),
                })?;
                Some(self.store.insert(
                    Some(action),
                    NodeKind::Variable(VariableNode {
                        name: binding.name.clone(),
                        type_id: output.type_id.clone(),
                        multiple: output.multiple,
                        optional: output.optional,
                        title: output.title.clone(),
                        description: binding.description.clone(),
                        reference_keys: Vec::new(),
                    }),
                ))
            }
        };

        let node = self.store.action_mut(action)?;
        node.arguments = arguments;
        node.variable_key = variable_key;
        Ok(action)
    }

    fn control(&mut self, parent: ContentKey, config: &ControlConfig) -> Result<ContentKey> {
        let control = self.store.insert(
            Some(parent),
            NodeKind::Control(ControlNode {
                control_type: config.control_type,
                blocks: Vec::new(),
                arguments: BTreeMap::new(),
            }),
        );

        let condition = self.argument(
            control,
            CONDITION_SLOT,
            &condition_parameter(),
            std::slice::from_ref(&config.condition),
        )?;
        let blocks = config
            .blocks
            .iter()
            .map(|block| self.block(control, block))
            .collect::<Result<Vec<_>>>()?;

        let node = self.store.control_mut(control)?;
        node.arguments.insert(CONDITION_SLOT.to_string(), condition);
        node.blocks = blocks;
        Ok(control)
    }

    /// One Argument per declared input; configured arguments must all be declared
    fn arguments(
        &mut self,
        owner: ContentKey,
        callable: &str,
        inputs: &BTreeMap<String, ParameterSpec>,
        configured: &BTreeMap<String, Vec<ExpressionConfig>>,
    ) -> Result<BTreeMap<String, ContentKey>> {
        if let Some(unknown) = configured.keys().find(|name| !inputs.contains_key(*name)) {
            return Err(EngineError::UnknownParameter {
                callable: callable.to_string(),
                parameter: unknown.clone(),
            });
        }

        let mut arguments = BTreeMap::new();
        for (name, param) in inputs {
            let expressions = configured.get(name).map(Vec::as_slice).unwrap_or_default();
            let argument = self.argument(owner, name, param, expressions)?;
            arguments.insert(name.clone(), argument);
        }
        Ok(arguments)
    }

    fn argument(
        &mut self,
        owner: ContentKey,
        name: &str,
        param: &ParameterSpec,
        expressions: &[ExpressionConfig],
    ) -> Result<ContentKey> {
        let argument = self.store.insert(
            Some(owner),
            NodeKind::Argument(ArgumentNode {
                name: name.to_string(),
                declared_type: param.type_id.clone(),
                multiple: param.multiple,
                required: param.required,
                allowed_type: expand(&param.type_id, self.catalog.types()),
                propagates: param.propagates_type(),
                calculated_type: TypeUnion::empty(),
                calculated_multiple: false,
                children: Vec::new(),
            }),
        );

        if !param.multiple && expressions.len() > 1 {
            return Err(EngineError::NotMultiValued { key: argument });
        }

        if expressions.is_empty() && !param.multiple {
            push_default_value(self.store, argument)?;
            return Ok(argument);
        }

        let children = expressions
            .iter()
            .map(|expression| self.expression(argument, expression))
            .collect::<Result<Vec<_>>>()?;
        self.store.argument_mut(argument)?.children = children;
        Ok(argument)
    }

    fn expression(&mut self, parent: ContentKey, config: &ExpressionConfig) -> Result<ContentKey> {
        match config {
            ExpressionConfig::Value(value) => Ok(self.store.insert(
                Some(parent),
                NodeKind::Value(ValueNode {
                    value: value.value.clone(),
                    ..empty_value(TypeUnion::single(value.type_id.clone()))
                }),
            )),
            ExpressionConfig::Function(function) => self.function(parent, function),
            ExpressionConfig::Reference(reference) => {
                // producer is filled in by resolve_references
                let key = self.store.insert(
                    Some(parent),
                    NodeKind::Reference(ReferenceNode {
                        variable_key: parent,
                        path: Vec::new(),
                        type_id: TypeUnion::empty(),
                        multiple: false,
                        optional: false,
                        reachability: Reachability::Valid,
                    }),
                );
                self.pending.push((key, reference.clone()));
                Ok(key)
            }
        }
    }

    fn function(&mut self, parent: ContentKey, config: &FunctionConfig) -> Result<ContentKey> {
        let spec = self
            .catalog
            .spec()
            .function(&config.name)
            .ok_or_else(|| EngineError::UnknownFunction {
                name: config.name.clone(),
            })?;

        let (output_type, output_multiple) = spec
            .output
            .as_ref()
            .map(|o| (o.type_id.clone(), o.multiple))
            .unwrap_or_default();
        let function = self.store.insert(
            Some(parent),
            NodeKind::Function(FunctionNode {
                name: config.name.clone(),
                output_type,
                output_multiple,
                arguments: BTreeMap::new(),
            }),
        );

        let arguments = self.arguments(function, &config.name, &spec.inputs, &config.arguments)?;
        self.store.function_mut(function)?.arguments = arguments;
        Ok(function)
    }

    fn resolve_references(self, process: ContentKey) -> Result<()> {
        let root_block = self.store.process(process)?.root_block;
        self.resolve_references_from(root_block)
    }

    /// Point every pending reference at its producer's variable
    fn resolve_references_from(self, root_block: ContentKey) -> Result<()> {
        let process = self.store.parent_of(root_block)?;
        for (key, config) in self.pending {
            let (variable_key, path) = if config.coordinates.is_empty() {
                let (name, rest) = config.path.split_first().ok_or_else(|| {
                    EngineError::UnresolvedCoordinates {
                        coordinates: Vec::new(),
                    }
                })?;
                let inputs = &self.store.process(process)?.inputs;
                let variable = inputs
                    .iter()
                    .copied()
                    .find(|k| self.store.variable(*k).is_ok_and(|v| &v.name == name))
                    .ok_or_else(|| EngineError::UnknownInput { name: name.clone() })?;
                (variable, rest.to_vec())
            } else {
                let unresolved = || EngineError::UnresolvedCoordinates {
                    coordinates: config.coordinates.clone(),
                };
                let producer = node_at(self.store, root_block, &config.coordinates)?;
                let variable = self
                    .store
                    .get(producer)?
                    .as_action()
                    .and_then(|a| a.variable_key)
                    .ok_or_else(unresolved)?;
                (variable, config.path.clone())
            };

            let reference = self.store.reference_mut(key)?;
            reference.variable_key = variable_key;
            reference.path = path;
            self.store
                .variable_mut(variable_key)?
                .reference_keys
                .push(key);
        }
        Ok(())
    }
}
