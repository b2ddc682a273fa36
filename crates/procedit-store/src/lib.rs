//! procedit Store - configuration boundary for the editing engine
//!
//! Provides:
//! - Document format detection (YAML or JSON) by file extension
//! - Loading of engine specifications and process configurations
//! - Writing exported configurations back out
//! - One-call session setup: spec + configuration to a validated engine state

pub mod errors;
pub mod format;
pub mod loader;
pub mod session;

// Re-export key types
pub use errors::Result;
pub use format::Format;
pub use loader::{
    load_config_file, load_spec_file, parse_config_str, parse_spec_str, render_config,
    write_config_file,
};
pub use session::{load_catalog, open_session};
