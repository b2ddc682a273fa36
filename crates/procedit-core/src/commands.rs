//! Command types representing every editing operation
//!
//! This module defines the command inventory that serves as the entry point
//! for functional-boundary edits via the `apply()` function.

use crate::model::{ContentKey, ExecutableConfig, ExpressionConfig};

/// Command enum representing all editing operations
///
/// Commands are processed by the `apply()` function, which takes ownership of
/// the current state, executes the command, and returns the new fully
/// revalidated state.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the literal text of a Value
    SetValue { key: ContentKey, value: String },

    /// Narrow a Value to one allowed type
    SetValueType { key: ContentKey, type_id: String },

    /// Replace any expression with one built from configuration
    ReplaceExpression {
        key: ContentKey,
        expression: ExpressionConfig,
    },

    /// Turn a Value into a call of a declared function
    ConvertValueToFunction { key: ContentKey, function: String },

    /// Turn a Value into a reference to a variable (optionally into a property)
    ConvertValueToReference {
        key: ContentKey,
        variable: ContentKey,
        path: Vec<String>,
    },

    /// Turn a Function or Reference back into an empty Value
    ConvertToValue { key: ContentKey },

    /// Append an empty Value to a multi-valued Argument
    AddInputValue { argument: ContentKey },

    /// Delete an expression or an executable
    DeleteItem { key: ContentKey },

    /// Build an Action or Control and insert it into a Block
    InsertExecutable {
        block: ContentKey,
        index: usize,
        executable: ExecutableConfig,
    },

    /// Re-parent an Action or Control
    MoveExecutable {
        key: ContentKey,
        block: ContentKey,
        index: usize,
    },

    /// Reposition one expression inside a multi-valued Argument
    ReorderInput {
        argument: ContentKey,
        old_index: usize,
        new_index: usize,
    },

    /// Reposition one executable inside a Block
    ReorderList {
        block: ContentKey,
        old_index: usize,
        new_index: usize,
    },

    /// Rename a Variable
    RenameVariable { variable: ContentKey, name: String },

    /// Select a node, or clear the selection
    SetSelection { key: Option<ContentKey> },
}

impl Command {
    /// Operation name used in logs
    pub fn op_name(&self) -> &'static str {
        match self {
            Command::SetValue { .. } => "set_value",
            Command::SetValueType { .. } => "set_value_type",
            Command::ReplaceExpression { .. } => "replace_expression",
            Command::ConvertValueToFunction { .. } => "convert_value_to_function",
            Command::ConvertValueToReference { .. } => "convert_value_to_reference",
            Command::ConvertToValue { .. } => "convert_to_value",
            Command::AddInputValue { .. } => "add_input_value",
            Command::DeleteItem { .. } => "delete_item",
            Command::InsertExecutable { .. } => "insert_executable",
            Command::MoveExecutable { .. } => "move_executable",
            Command::ReorderInput { .. } => "reorder_input",
            Command::ReorderList { .. } => "reorder_list",
            Command::RenameVariable { .. } => "rename_variable",
            Command::SetSelection { .. } => "set_selection",
        }
    }

    /// Key of the node the command primarily targets
    pub fn target(&self) -> Option<ContentKey> {
        match self {
            Command::SetValue { key, .. }
            | Command::SetValueType { key, .. }
            | Command::ReplaceExpression { key, .. }
            | Command::ConvertValueToFunction { key, .. }
            | Command::ConvertValueToReference { key, .. }
            | Command::ConvertToValue { key }
            | Command::DeleteItem { key }
            | Command::MoveExecutable { key, .. } => Some(*key),
            Command::AddInputValue { argument } | Command::ReorderInput { argument, .. } => {
                Some(*argument)
            }
            Command::InsertExecutable { block, .. } | Command::ReorderList { block, .. } => {
                Some(*block)
            }
            Command::RenameVariable { variable, .. } => Some(*variable),
            Command::SetSelection { key } => *key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_names_are_snake_case() {
        let cmd = Command::ConvertValueToFunction {
            key: ContentKey::new(3),
            function: "concat".to_string(),
        };
        assert_eq!(cmd.op_name(), "convert_value_to_function");
        assert_eq!(cmd.target(), Some(ContentKey::new(3)));
    }

    #[test]
    fn test_clear_selection_has_no_target() {
        let cmd = Command::SetSelection { key: None };
        assert_eq!(cmd.target(), None);
        assert_eq!(cmd.op_name(), "set_selection");
    }
}
