//! Guard policy trait and implementations
//!
//! This module defines the `GuardPolicy` trait, which decides whether a
//! reference classified OPTIONAL (its producer sits in a conditional branch
//! relative to the use) is protected by a guard the engine cannot see.

use std::collections::HashSet;

use crate::model::ContentKey;

/// Policy trait for confirming guards around OPTIONAL references
///
/// An unguarded OPTIONAL reference receives a non-blocking
/// `UNCHECKED_REFERENCE` warning. A guarded one receives nothing.
///
/// This policy is injected into `apply()` and every editing operation so the
/// caller decides what counts as a guard.
pub trait GuardPolicy {
    /// Check if an OPTIONAL reference is guarded
    ///
    /// # Arguments
    /// * `reference_key` - Key of the reference node being validated
    /// * `variable_name` - Name of the variable it points at
    ///
    /// # Returns
    /// * `true` - suppress the warning
    /// * `false` - attach `UNCHECKED_REFERENCE`
    fn is_guarded(&self, reference_key: ContentKey, variable_name: &str) -> bool;
}

/// Policy that never observes a guard
///
/// Every OPTIONAL reference is warned about. This is the default.
///
/// # Example
/// ```
/// use procedit_core::model::ContentKey;
/// use procedit_core::policy::{GuardPolicy, NeverGuardedPolicy};
///
/// let policy = NeverGuardedPolicy;
/// assert!(!policy.is_guarded(ContentKey::new(7), "counter"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverGuardedPolicy;

impl GuardPolicy for NeverGuardedPolicy {
    fn is_guarded(&self, _reference_key: ContentKey, _variable_name: &str) -> bool {
        false
    }
}

/// Policy that treats every OPTIONAL reference as guarded
///
/// # Example
/// ```
/// use procedit_core::model::ContentKey;
/// use procedit_core::policy::{AlwaysGuardedPolicy, GuardPolicy};
///
/// let policy = AlwaysGuardedPolicy;
/// assert!(policy.is_guarded(ContentKey::new(7), "counter"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysGuardedPolicy;

impl GuardPolicy for AlwaysGuardedPolicy {
    fn is_guarded(&self, _reference_key: ContentKey, _variable_name: &str) -> bool {
        true
    }
}

/// Policy that treats references to specific variables as guarded
///
/// # Example
/// ```
/// use procedit_core::model::ContentKey;
/// use procedit_core::policy::{GuardPolicy, SelectedGuardedPolicy};
/// use std::collections::HashSet;
///
/// let mut guarded = HashSet::new();
/// guarded.insert("result".to_string());
///
/// let policy = SelectedGuardedPolicy::new(guarded);
/// assert!(policy.is_guarded(ContentKey::new(1), "result"));
/// assert!(!policy.is_guarded(ContentKey::new(1), "counter"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SelectedGuardedPolicy {
    /// Variable names whose OPTIONAL references are considered guarded
    guarded_variables: HashSet<String>,
}

impl SelectedGuardedPolicy {
    pub fn new(guarded_variables: HashSet<String>) -> Self {
        Self { guarded_variables }
    }
}

impl GuardPolicy for SelectedGuardedPolicy {
    fn is_guarded(&self, _reference_key: ContentKey, variable_name: &str) -> bool {
        self.guarded_variables.contains(variable_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_guarded_policy() {
        let policy = NeverGuardedPolicy;
        assert!(!policy.is_guarded(ContentKey::new(0), "x"));
    }

    #[test]
    fn test_always_guarded_policy() {
        let policy = AlwaysGuardedPolicy;
        assert!(policy.is_guarded(ContentKey::new(0), "x"));
    }

    #[test]
    fn test_selected_guarded_policy() {
        let policy = SelectedGuardedPolicy::new(["a".to_string()].into_iter().collect());
        assert!(policy.is_guarded(ContentKey::new(3), "a"));
        assert!(!policy.is_guarded(ContentKey::new(3), "b"));
    }

    #[test]
    fn test_policy_is_object_safe() {
        let policies: Vec<Box<dyn GuardPolicy>> =
            vec![Box::new(NeverGuardedPolicy), Box::new(AlwaysGuardedPolicy)];
        let verdicts: Vec<bool> = policies
            .iter()
            .map(|p| p.is_guarded(ContentKey::new(1), "v"))
            .collect();
        assert_eq!(verdicts, vec![false, true]);
    }
}
