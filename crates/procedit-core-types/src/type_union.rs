//! Canonical type identifier sets
//!
//! A `TypeUnion` is a sorted, duplicate-free sequence of `TypeId`s meaning
//! "at least one of these types". Every constructor canonicalizes, so two
//! unions holding the same members always compare equal.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque identifier of a declared type
pub type TypeId = String;

/// Sorted, duplicate-free set of type identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TypeUnion(Vec<TypeId>);

impl TypeUnion {
    /// Build a canonical union from any collection of ids
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TypeId>,
    {
        let mut ids: Vec<TypeId> = ids.into_iter().map(Into::into).collect();
        ids.sort();
        ids.dedup();
        Self(ids)
    }

    /// The empty union
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// A union with exactly one member
    pub fn single(id: impl Into<TypeId>) -> Self {
        Self(vec![id.into()])
    }

    pub fn as_slice(&self) -> &[TypeId] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First member in canonical order
    pub fn first(&self) -> Option<&TypeId> {
        self.0.first()
    }

    /// Membership test (binary search over the sorted members)
    pub fn contains(&self, id: &str) -> bool {
        self.0.binary_search_by(|probe| probe.as_str().cmp(id)).is_ok()
    }

    /// True when every member of `other` is also a member of `self`
    pub fn contains_all(&self, other: &TypeUnion) -> bool {
        other.iter().all(|id| self.contains(id))
    }

    /// Sorted merge of two unions with duplicate elimination
    pub fn union(&self, other: &TypeUnion) -> TypeUnion {
        let (a, b) = (&self.0, &other.0);
        let mut merged = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);

        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    merged.push(a[i].clone());
                    i += 1;
                }
                Ordering::Greater => {
                    merged.push(b[j].clone());
                    j += 1;
                }
                Ordering::Equal => {
                    merged.push(a[i].clone());
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend(a[i..].iter().cloned());
        merged.extend(b[j..].iter().cloned());

        TypeUnion(merged)
    }

    /// Insert one id, keeping the canonical order
    pub fn insert(&mut self, id: impl Into<TypeId>) {
        let id = id.into();
        if let Err(pos) = self.0.binary_search(&id) {
            self.0.insert(pos, id);
        }
    }

    pub fn into_vec(self) -> Vec<TypeId> {
        self.0
    }
}

/// Sorted merge of two unions
pub fn union(a: &TypeUnion, b: &TypeUnion) -> TypeUnion {
    a.union(b)
}

/// True when every id in `compare` appears directly in `reference`
pub fn is_subset(reference: &TypeUnion, compare: &TypeUnion) -> bool {
    reference.contains_all(compare)
}

impl<S: Into<TypeId>> FromIterator<S> for TypeUnion {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        TypeUnion::new(iter)
    }
}

impl<'a> IntoIterator for &'a TypeUnion {
    type Item = &'a TypeId;
    type IntoIter = std::slice::Iter<'a, TypeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<TypeId>> for TypeUnion {
    fn from(ids: Vec<TypeId>) -> Self {
        TypeUnion::new(ids)
    }
}

impl From<&str> for TypeUnion {
    fn from(id: &str) -> Self {
        TypeUnion::single(id)
    }
}

impl fmt::Display for TypeUnion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" | "))
    }
}

/// Accepts either a single id or a list of ids
impl<'de> Deserialize<'de> for TypeUnion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            One(TypeId),
            Many(Vec<TypeId>),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::One(id) => TypeUnion::single(id),
            Repr::Many(ids) => TypeUnion::new(ids),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-e]{1,2}", 0..6)
    }

    fn is_canonical(u: &TypeUnion) -> bool {
        u.as_slice().windows(2).all(|w| w[0] < w[1])
    }

    #[test]
    fn test_new_sorts_and_dedups() {
        let u = TypeUnion::new(["text", "integer", "text", "boolean"]);
        assert_eq!(u.as_slice(), &["boolean", "integer", "text"]);
    }

    #[test]
    fn test_contains_uses_sorted_members() {
        let u = TypeUnion::new(["c", "a", "b"]);
        assert!(u.contains("a"));
        assert!(u.contains("c"));
        assert!(!u.contains("d"));
    }

    #[test]
    fn test_is_subset_direction() {
        let reference = TypeUnion::new(["a", "b", "c"]);
        let compare = TypeUnion::new(["a", "c"]);
        assert!(is_subset(&reference, &compare));
        assert!(!is_subset(&compare, &reference));
        assert!(is_subset(&reference, &TypeUnion::empty()));
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut u = TypeUnion::new(["a", "c"]);
        u.insert("b");
        u.insert("a");
        assert_eq!(u.as_slice(), &["a", "b", "c"]);
    }

    #[test]
    fn test_deserialize_single_or_list() {
        let one: TypeUnion = serde_json::from_str("\"string\"").unwrap();
        assert_eq!(one, TypeUnion::single("string"));

        let many: TypeUnion = serde_json::from_str("[\"b\", \"a\", \"b\"]").unwrap();
        assert_eq!(many.as_slice(), &["a", "b"]);
    }

    #[test]
    fn test_display_joins_members() {
        assert_eq!(TypeUnion::new(["b", "a"]).to_string(), "a | b");
    }

    proptest! {
        #[test]
        fn prop_union_is_commutative(a in ids(), b in ids()) {
            let (a, b) = (TypeUnion::new(a), TypeUnion::new(b));
            prop_assert_eq!(union(&a, &b), union(&b, &a));
        }

        #[test]
        fn prop_union_is_associative(a in ids(), b in ids(), c in ids()) {
            let (a, b, c) = (TypeUnion::new(a), TypeUnion::new(b), TypeUnion::new(c));
            prop_assert_eq!(union(&union(&a, &b), &c), union(&a, &union(&b, &c)));
        }

        #[test]
        fn prop_union_is_idempotent(a in ids()) {
            let a = TypeUnion::new(a);
            prop_assert_eq!(union(&a, &a), a);
        }

        #[test]
        fn prop_union_is_canonical_superset(a in ids(), b in ids()) {
            let (a, b) = (TypeUnion::new(a), TypeUnion::new(b));
            let u = union(&a, &b);
            prop_assert!(is_canonical(&u));
            prop_assert!(is_subset(&u, &a));
            prop_assert!(is_subset(&u, &b));
        }
    }
}
