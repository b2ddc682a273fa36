pub mod construct;
pub mod export;
pub mod store;
pub mod structure_ops;
pub mod value_ops;

pub use construct::{
    construct, default_value_type, insert_executable, push_default_value, replace,
    replace_with_default_value,
};
pub use export::{export, export_executable, export_expression};
pub use store::ContentStore;
