//! Transitive closure over the declared subtype hierarchy
//!
//! Built once per catalog load and read-only afterwards. All relation sets
//! are canonical `TypeUnion`s so they can be merged and probed cheaply.

use procedit_core_types::{TypeId, TypeUnion};
use std::collections::{BTreeMap, HashMap};

use crate::errors::{EngineError, Result};
use crate::model::TypeSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Derived parent/child/ancestor/descendant relations of the type catalog
#[derive(Debug, Clone, Default)]
pub struct TypeSystem {
    type_ids: TypeUnion,
    parents: HashMap<TypeId, TypeUnion>,
    children: HashMap<TypeId, TypeUnion>,
    ancestors: HashMap<TypeId, TypeUnion>,
    descendants: HashMap<TypeId, TypeUnion>,
    empty: TypeUnion,
}

impl TypeSystem {
    /// Build the closure from per-type declared supertypes
    ///
    /// # Errors
    /// * `UnknownType` - A type names a parent that is not declared
    /// * `TypeCycleDetected` - The declared hierarchy contains a cycle
    pub fn build(types: &BTreeMap<TypeId, TypeSpec>) -> Result<Self> {
        let type_ids = TypeUnion::new(types.keys().cloned());

        let mut parents: HashMap<TypeId, TypeUnion> = HashMap::new();
        let mut children: HashMap<TypeId, TypeUnion> = HashMap::new();
        for id in &type_ids {
            parents.insert(id.clone(), TypeUnion::empty());
            children.insert(id.clone(), TypeUnion::empty());
        }

        for (id, spec) in types {
            for parent in &spec.parents {
                if !type_ids.contains(parent) {
                    return Err(EngineError::UnknownType {
                        type_id: parent.clone(),
                    });
                }
                if parent == id {
                    return Err(EngineError::TypeCycleDetected {
                        type_id: id.clone(),
                    });
                }
                if let Some(p) = parents.get_mut(id) {
                    p.insert(parent.clone());
                }
                if let Some(c) = children.get_mut(parent) {
                    c.insert(id.clone());
                }
            }
        }

        let mut descendants: HashMap<TypeId, TypeUnion> = HashMap::new();
        let mut state: HashMap<TypeId, Visit> = HashMap::new();
        for id in &type_ids {
            collect_descendants(id, &children, &mut descendants, &mut state)?;
        }

        let mut ancestors: HashMap<TypeId, TypeUnion> = type_ids
            .iter()
            .map(|id| (id.clone(), TypeUnion::empty()))
            .collect();
        for (id, below) in &descendants {
            for d in below {
                if let Some(a) = ancestors.get_mut(d) {
                    a.insert(id.clone());
                }
            }
        }

        tracing::debug!(type_count = type_ids.len(), "type system built");

        Ok(Self {
            type_ids,
            parents,
            children,
            ancestors,
            descendants,
            empty: TypeUnion::empty(),
        })
    }

    /// Canonical union of all declared type ids
    pub fn type_ids(&self) -> &TypeUnion {
        &self.type_ids
    }

    pub fn is_declared(&self, id: &str) -> bool {
        self.type_ids.contains(id)
    }

    pub fn parents(&self, id: &str) -> &TypeUnion {
        self.parents.get(id).unwrap_or(&self.empty)
    }

    pub fn children(&self, id: &str) -> &TypeUnion {
        self.children.get(id).unwrap_or(&self.empty)
    }

    pub fn ancestors(&self, id: &str) -> &TypeUnion {
        self.ancestors.get(id).unwrap_or(&self.empty)
    }

    pub fn descendants(&self, id: &str) -> &TypeUnion {
        self.descendants.get(id).unwrap_or(&self.empty)
    }

    /// `id` itself followed by all of its ancestors
    pub fn lineage(&self, id: &str) -> Vec<TypeId> {
        let mut out = vec![id.to_string()];
        out.extend(self.ancestors(id).iter().cloned());
        out
    }
}

/// Memoized depth-first closure; a revisit while in progress is a cycle
fn collect_descendants(
    id: &TypeId,
    children: &HashMap<TypeId, TypeUnion>,
    descendants: &mut HashMap<TypeId, TypeUnion>,
    state: &mut HashMap<TypeId, Visit>,
) -> Result<TypeUnion> {
    match state.get(id) {
        Some(Visit::Done) => return Ok(descendants.get(id).cloned().unwrap_or_default()),
        Some(Visit::InProgress) => {
            return Err(EngineError::TypeCycleDetected {
                type_id: id.clone(),
            })
        }
        None => {}
    }

    state.insert(id.clone(), Visit::InProgress);

    let mut below = TypeUnion::empty();
    if let Some(direct) = children.get(id) {
        for child in direct {
            below.insert(child.clone());
            let nested = collect_descendants(child, children, descendants, state)?;
            below = below.union(&nested);
        }
    }

    state.insert(id.clone(), Visit::Done);
    descendants.insert(id.clone(), below.clone());
    Ok(below)
}

/// Every member of `input` is in `required` or descends from one of its members
pub fn matches_requirement(input: &TypeUnion, required: &TypeUnion, types: &TypeSystem) -> bool {
    input.iter().all(|t| {
        required.contains(t) || required.iter().any(|r| types.descendants(r).contains(t))
    })
}

/// `type_id` unioned with every descendant of each member
pub fn expand(type_id: &TypeUnion, types: &TypeSystem) -> TypeUnion {
    type_id
        .iter()
        .fold(type_id.clone(), |acc, t| acc.union(types.descendants(t)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spec(parents: &[&str]) -> TypeSpec {
        TypeSpec {
            parents: parents.iter().map(|p| p.to_string()).collect(),
            ..TypeSpec::default()
        }
    }

    /// object <- string <- email
    ///        <- number <- integer
    fn catalog() -> BTreeMap<TypeId, TypeSpec> {
        let mut types = BTreeMap::new();
        types.insert("object".to_string(), spec(&[]));
        types.insert("string".to_string(), spec(&["object"]));
        types.insert("email".to_string(), spec(&["string"]));
        types.insert("number".to_string(), spec(&["object"]));
        types.insert("integer".to_string(), spec(&["number"]));
        types
    }

    #[test]
    fn test_direct_relations() {
        let ts = TypeSystem::build(&catalog()).unwrap();
        assert_eq!(ts.parents("email").as_slice(), &["string"]);
        assert_eq!(ts.children("object").as_slice(), &["number", "string"]);
        assert!(ts.children("email").is_empty());
    }

    #[test]
    fn test_transitive_closure() {
        let ts = TypeSystem::build(&catalog()).unwrap();
        assert_eq!(
            ts.descendants("object").as_slice(),
            &["email", "integer", "number", "string"]
        );
        assert_eq!(ts.ancestors("email").as_slice(), &["object", "string"]);
        assert!(!ts.ancestors("object").contains("object"));
    }

    #[test]
    fn test_diamond_hierarchy() {
        let mut types = catalog();
        types.insert("numeric-text".to_string(), spec(&["string", "number"]));
        let ts = TypeSystem::build(&types).unwrap();
        assert_eq!(
            ts.ancestors("numeric-text").as_slice(),
            &["number", "object", "string"]
        );
        assert!(ts.descendants("number").contains("numeric-text"));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut types = BTreeMap::new();
        types.insert("a".to_string(), spec(&["b"]));
        types.insert("b".to_string(), spec(&["a"]));
        let result = TypeSystem::build(&types);
        assert!(matches!(result, Err(EngineError::TypeCycleDetected { .. })));
    }

    #[test]
    fn test_self_parent_is_rejected() {
        let mut types = BTreeMap::new();
        types.insert("a".to_string(), spec(&["a"]));
        assert!(matches!(
            TypeSystem::build(&types),
            Err(EngineError::TypeCycleDetected { .. })
        ));
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let mut types = BTreeMap::new();
        types.insert("a".to_string(), spec(&["missing"]));
        assert!(matches!(
            TypeSystem::build(&types),
            Err(EngineError::UnknownType { type_id }) if type_id == "missing"
        ));
    }

    #[test]
    fn test_build_is_idempotent() {
        let a = TypeSystem::build(&catalog()).unwrap();
        let b = TypeSystem::build(&catalog()).unwrap();
        for id in a.type_ids() {
            assert_eq!(a.descendants(id), b.descendants(id));
            assert_eq!(a.ancestors(id), b.ancestors(id));
        }
    }

    #[test]
    fn test_matches_requirement_via_descendants() {
        let ts = TypeSystem::build(&catalog()).unwrap();
        let required = TypeUnion::single("string");
        assert!(matches_requirement(&TypeUnion::single("email"), &required, &ts));
        assert!(!matches_requirement(&TypeUnion::single("integer"), &required, &ts));
        assert!(!matches_requirement(
            &TypeUnion::new(["email", "integer"]),
            &required,
            &ts
        ));
        assert!(matches_requirement(&TypeUnion::empty(), &required, &ts));
        // supertypes do not satisfy a narrower requirement
        assert!(!matches_requirement(&TypeUnion::single("object"), &required, &ts));
    }

    #[test]
    fn test_expand_contains_self_and_descendants_only() {
        let ts = TypeSystem::build(&catalog()).unwrap();
        assert_eq!(
            expand(&TypeUnion::single("number"), &ts).as_slice(),
            &["integer", "number"]
        );
        assert_eq!(
            expand(&TypeUnion::new(["email", "number"]), &ts).as_slice(),
            &["email", "integer", "number"]
        );
    }

    proptest! {
        #[test]
        fn prop_matches_requirement_is_reflexive(idx in 0usize..5) {
            let ts = TypeSystem::build(&catalog()).unwrap();
            let t = TypeUnion::single(ts.type_ids().as_slice()[idx].clone());
            prop_assert!(matches_requirement(&t, &t, &ts));
        }

        #[test]
        fn prop_expand_is_self_plus_descendants(idx in 0usize..5) {
            let ts = TypeSystem::build(&catalog()).unwrap();
            let id = ts.type_ids().as_slice()[idx].clone();
            let expanded = expand(&TypeUnion::single(id.clone()), &ts);
            let mut expected = ts.descendants(&id).clone();
            expected.insert(id);
            prop_assert_eq!(expanded, expected);
        }
    }
}
