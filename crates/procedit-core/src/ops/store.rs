use std::collections::HashMap;

use crate::errors::{EngineError, Result};
use crate::model::{
    ActionNode, ArgumentNode, BlockNode, ContentKey, ContentKind, ContentNode, ControlNode,
    FunctionNode, NodeKind, ProcessNode, ReferenceNode, ValueNode, VariableNode,
};

/// Arena of content nodes addressed by generated keys
///
/// Not thread-safe (no Arc/RwLock) - designed for single-threaded use. The
/// store exclusively owns every node; all cross-links are keys.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pub(crate) nodes: HashMap<ContentKey, ContentNode>,
    next_key: u64,
}

macro_rules! typed_lookup {
    ($($get:ident, $get_mut:ident, $as:ident, $as_mut:ident => $ty:ty, $kind:ident;)*) => {
        impl ContentStore {
            $(
                /// Typed lookup
                ///
                /// # Errors
                /// `NodeNotFound` or `WrongNodeKind`
                pub fn $get(&self, key: ContentKey) -> Result<&$ty> {
                    let node = self.get(key)?;
                    let actual = node.kind();
                    node.$as().ok_or(EngineError::WrongNodeKind {
                        key,
                        expected: ContentKind::$kind,
                        actual,
                    })
                }

                /// Typed mutable lookup
                ///
                /// # Errors
                /// `NodeNotFound` or `WrongNodeKind`
                pub fn $get_mut(&mut self, key: ContentKey) -> Result<&mut $ty> {
                    let node = self.get_mut(key)?;
                    let actual = node.kind();
                    node.$as_mut().ok_or(EngineError::WrongNodeKind {
                        key,
                        expected: ContentKind::$kind,
                        actual,
                    })
                }
            )*
        }
    };
}

typed_lookup! {
    process, process_mut, as_process, as_process_mut => ProcessNode, Process;
    control, control_mut, as_control, as_control_mut => ControlNode, Control;
    action, action_mut, as_action, as_action_mut => ActionNode, Action;
    function, function_mut, as_function, as_function_mut => FunctionNode, Function;
    block, block_mut, as_block, as_block_mut => BlockNode, Block;
    argument, argument_mut, as_argument, as_argument_mut => ArgumentNode, Argument;
    value, value_mut, as_value, as_value_mut => ValueNode, Value;
    reference, reference_mut, as_reference, as_reference_mut => ReferenceNode, Reference;
    variable, variable_mut, as_variable, as_variable_mut => VariableNode, Variable;
}

impl ContentStore {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            next_key: 0,
        }
    }

    /// Get a node by key
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the key is not in the store.
    pub fn get(&self, key: ContentKey) -> Result<&ContentNode> {
        self.nodes.get(&key).ok_or(EngineError::NodeNotFound { key })
    }

    /// Get a mutable node by key
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the key is not in the store.
    pub fn get_mut(&mut self, key: ContentKey) -> Result<&mut ContentNode> {
        self.nodes
            .get_mut(&key)
            .ok_or(EngineError::NodeNotFound { key })
    }

    pub fn contains(&self, key: ContentKey) -> bool {
        self.nodes.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All keys in ascending (allocation) order
    pub fn keys(&self) -> Vec<ContentKey> {
        let mut keys: Vec<ContentKey> = self.nodes.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Allocate a fresh key and store a node under it
    pub fn insert(&mut self, parent_key: Option<ContentKey>, kind: NodeKind) -> ContentKey {
        let key = ContentKey::new(self.next_key);
        self.next_key += 1;
        self.nodes.insert(key, ContentNode::new(key, parent_key, kind));
        key
    }

    /// Parent key of a node
    ///
    /// # Errors
    /// `NodeNotFound` if the key is unknown, `DetachedNode` for the root.
    pub fn parent_of(&self, key: ContentKey) -> Result<ContentKey> {
        self.get(key)?
            .parent_key
            .ok_or(EngineError::DetachedNode { key })
    }

    pub fn set_parent(&mut self, key: ContentKey, parent_key: ContentKey) -> Result<()> {
        self.get_mut(key)?.parent_key = Some(parent_key);
        Ok(())
    }

    /// Depth-first eviction of a node and everything it owns
    ///
    /// Does not touch the parent's child list; callers remove the key from
    /// there in the same operation. Evicted references are unregistered from
    /// their variable's back-list.
    ///
    /// # Errors
    /// `NodeNotFound` if `key` is not in the store.
    pub fn recursive_delete(&mut self, key: ContentKey) -> Result<Vec<ContentKey>> {
        self.get(key)?;

        let mut evicted = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.remove(&current) else {
                continue;
            };
            stack.extend(node.children());

            if let NodeKind::Reference(reference) = &node.kind {
                if let Some(variable) = self
                    .nodes
                    .get_mut(&reference.variable_key)
                    .and_then(ContentNode::as_variable_mut)
                {
                    variable.reference_keys.retain(|k| *k != current);
                }
            }
            evicted.push(current);
        }

        tracing::debug!(key = %key, evicted = evicted.len(), "recursive delete");
        Ok(evicted)
    }

    /// Move one element of an ordered child list, keeping the others' order
    ///
    /// Applies to a Block's executables and a multi-valued Argument's children.
    ///
    /// # Errors
    /// * `NotAList` - node owns no reorderable list (including single-valued arguments)
    /// * `IndexOutOfRange` - either index is outside the list
    pub fn reorder(&mut self, list_key: ContentKey, old_index: usize, new_index: usize) -> Result<()> {
        let node = self.get_mut(list_key)?;
        let list = match &mut node.kind {
            NodeKind::Block(block) => &mut block.executables,
            NodeKind::Argument(argument) if argument.multiple => &mut argument.children,
            _ => return Err(EngineError::NotAList { key: list_key }),
        };

        let len = list.len();
        for index in [old_index, new_index] {
            if index >= len {
                return Err(EngineError::IndexOutOfRange {
                    key: list_key,
                    index,
                    len,
                });
            }
        }

        let item = list.remove(old_index);
        list.insert(new_index, item);
        Ok(())
    }

    /// Swap `old` for `new` in the parent's child collections, in place
    ///
    /// # Errors
    /// `NodeNotFound` for the parent, `Internal` if `old` is not its child.
    pub fn replace_child(
        &mut self,
        parent_key: ContentKey,
        old: ContentKey,
        new: ContentKey,
    ) -> Result<()> {
        let parent = self.get_mut(parent_key)?;
        let swap = |k: &mut ContentKey| {
            if *k == old {
                *k = new;
                true
            } else {
                false
            }
        };

        let replaced = match &mut parent.kind {
            NodeKind::Process(p) => {
                p.inputs.iter_mut().any(swap)
                    || p.slots.values_mut().any(swap)
                    || swap(&mut p.root_block)
            }
            NodeKind::Block(b) => b.executables.iter_mut().any(swap),
            NodeKind::Control(c) => {
                c.arguments.values_mut().any(swap) || c.blocks.iter_mut().any(swap)
            }
            NodeKind::Action(a) => {
                a.arguments.values_mut().any(swap) || a.variable_key.as_mut().is_some_and(swap)
            }
            NodeKind::Function(f) => f.arguments.values_mut().any(swap),
            NodeKind::Argument(a) => a.children.iter_mut().any(swap),
            NodeKind::Value(_) | NodeKind::Reference(_) | NodeKind::Variable(_) => false,
        };

        if !replaced {
            return Err(EngineError::Internal {
                message: format!("{} is not a child of {}", old, parent_key),
            });
        }
        Ok(())
    }

    /// Every key reachable from `root` by owned-child traversal
    pub fn reachable_from(&self, root: ContentKey) -> Vec<ContentKey> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(key) = stack.pop() {
            if let Some(node) = self.nodes.get(&key) {
                out.push(key);
                stack.extend(node.children());
            }
        }
        out.sort();
        out
    }
}
