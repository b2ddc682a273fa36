//! procedit Core - in-memory editing engine for typed process trees
//!
//! This crate provides the data structures and operations for editing a
//! tree-shaped "process" program while keeping it type-correct and
//! referentially valid after every mutation:
//! - Type system: transitive closure over the declared subtype hierarchy
//! - Content store: key-addressed arena of tree nodes with parent back-links
//! - Coordinates: positional addresses used for ordering and reachability
//! - Validation and propagation: literal, reference and input-type checks
//! - Editing operations composed into atomic commands via `apply()`
//! - Configuration import/export (construction and its structural inverse)

pub mod apply;
pub mod commands;
pub mod engine;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod policy;
pub mod queries;
pub mod rules;
pub mod traversal;
pub mod types;

// Re-export commonly used types
pub use apply::apply;
pub use commands::Command;
pub use engine::{Catalog, EngineState};
pub use errors::{EngineError, ExError, ExErrorKind, Result};
pub use model::{
    ContentKey, ContentKind, ContentNode, EngineSpec, NodeKind, ProcessConfig, Reachability,
    ValidationCode, ValidationError,
};
pub use ops::ContentStore;
pub use policy::{AlwaysGuardedPolicy, GuardPolicy, NeverGuardedPolicy, SelectedGuardedPolicy};
pub use procedit_core_types::{TypeId, TypeUnion};
pub use types::TypeSystem;
