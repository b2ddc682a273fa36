//! Query module for read-only operations
//!
//! This module provides the read-only surface consumed by rendering layers
//! and other collaborators: selection, node lookup, parameter descriptions,
//! assignable variables and functions, and the collected validation errors.
//!
//! Key principles:
//! - All queries are read-only (no mutations)
//! - Results are deterministically ordered

pub mod content_queries;

pub use content_queries::{
    available_functions_for, available_variables_for, collect_errors, content, parameter_spec_for,
    selection, NodeError,
};
