pub mod invariants;
pub mod literal;
pub mod propagation;
pub mod reachability;
pub mod revalidate;

pub use literal::LiteralValidator;
pub use propagation::{propagate, propagate_argument, refresh_reference_type};
pub use reachability::{classify, classify_variable, validate_reference};
pub use revalidate::{
    affected_references, assignable_functions, assignable_variables, refresh_value_caches,
    revalidate_all, revalidate_references, revalidate_subtree, validate_value,
};
