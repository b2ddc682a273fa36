pub mod path;
pub mod type_system;

pub use path::{resolve_path, ResolvedPath};
pub use type_system::{expand, matches_requirement, TypeSystem};
