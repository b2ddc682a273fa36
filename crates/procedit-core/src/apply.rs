//! Functional-boundary apply function
//!
//! This module provides the `apply()` function, which is the canonical entry
//! point for atomic edits of an `EngineState`.
//!
//! ## Atomicity Contract
//!
//! - **Complete transitions**: a successful command returns a state in which
//!   every touched node is revalidated and every type change has propagated
//! - **No panics**: contract violations return typed errors
//! - **Caller-owned rollback**: the input state is consumed; a caller that
//!   needs to recover from an error keeps a clone
//!
//! ## Example
//!
//! ```no_run
//! use procedit_core::{apply, Command, EngineState, NeverGuardedPolicy};
//!
//! # fn run(state: EngineState, key: procedit_core::ContentKey) -> procedit_core::Result<()> {
//! let cmd = Command::SetValue { key, value: "Hello".to_string() };
//! let state = apply(state, cmd, &NeverGuardedPolicy)?;
//! # Ok(())
//! # }
//! ```

use crate::commands::Command;
use crate::engine::EngineState;
use crate::errors::Result;
use crate::ops::{structure_ops, value_ops};
use crate::policy::GuardPolicy;
use crate::{log_op_end, log_op_error, log_op_start};

/// Apply a command to an engine state, returning the new state
///
/// # Arguments
///
/// * `state` - Current engine state (ownership transferred)
/// * `cmd` - Command to execute
/// * `policy` - Guard policy for OPTIONAL references
///
/// # Errors
///
/// Returns the contract violation that stopped the command: a missing key, a
/// node of the wrong kind, an out-of-range index, an undeclared callable or
/// type. See `EngineError` for the full taxonomy.
pub fn apply(mut state: EngineState, cmd: Command, policy: &dyn GuardPolicy) -> Result<EngineState> {
    let op = cmd.op_name();
    let target = cmd.target().map(|k| k.to_string()).unwrap_or_default();
    log_op_start!(op, content_key = %target);
    let start = std::time::Instant::now();

    match execute(&mut state, cmd, policy) {
        Ok(()) => {
            let error_count = state.store.nodes.values().map(|n| n.errors.len()).sum::<usize>();
            log_op_end!(
                op,
                duration_ms = start.elapsed().as_millis() as u64,
                node_count = state.store.len(),
                error_count = error_count
            );
            Ok(state)
        }
        Err(err) => {
            log_op_error!(op, err.clone(), duration_ms = start.elapsed().as_millis() as u64);
            Err(err)
        }
    }
}

fn execute(state: &mut EngineState, cmd: Command, policy: &dyn GuardPolicy) -> Result<()> {
    match cmd {
        Command::SetValue { key, value } => value_ops::set_value(state, key, value),

        Command::SetValueType { key, type_id } => value_ops::set_value_type(state, key, type_id),

        Command::ReplaceExpression { key, expression } => {
            value_ops::replace_expression(state, key, &expression, policy).map(drop)
        }

        Command::ConvertValueToFunction { key, function } => {
            value_ops::convert_value_to_function(state, key, &function, policy).map(drop)
        }

        Command::ConvertValueToReference {
            key,
            variable,
            path,
        } => value_ops::convert_value_to_reference(state, key, variable, path, policy).map(drop),

        Command::ConvertToValue { key } => value_ops::convert_to_value(state, key, policy).map(drop),

        Command::AddInputValue { argument } => value_ops::add_input_value(state, argument).map(drop),

        Command::DeleteItem { key } => structure_ops::delete_item(state, key, policy),

        Command::InsertExecutable {
            block,
            index,
            executable,
        } => structure_ops::insert_executable(state, block, index, &executable, policy).map(drop),

        Command::MoveExecutable { key, block, index } => {
            structure_ops::move_executable(state, key, block, index, policy)
        }

        Command::ReorderInput {
            argument,
            old_index,
            new_index,
        } => structure_ops::reorder_input(state, argument, old_index, new_index),

        Command::ReorderList {
            block,
            old_index,
            new_index,
        } => structure_ops::reorder_list(state, block, old_index, new_index, policy),

        Command::RenameVariable { variable, name } => {
            structure_ops::rename_variable(state, variable, name, policy)
        }

        Command::SetSelection { key } => structure_ops::set_selection(state, key),
    }
}
