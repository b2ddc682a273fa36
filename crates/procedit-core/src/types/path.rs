//! Property-path resolution for references into compound types

use procedit_core_types::TypeUnion;

use crate::errors::{EngineError, Result};
use crate::model::EngineSpec;

use super::type_system::TypeSystem;

/// Type reached by walking a property path
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    pub type_id: TypeUnion,
    pub multiple: bool,
    pub optional: bool,
}

/// Walk `path` from a variable's type
///
/// Each segment is looked up on every member of the current type and on all
/// of their ancestors; the result is the union of every match. Multiplicity
/// and optionality accumulate along the way.
///
/// # Errors
/// `InvalidPath` if a segment is declared on none of the current members.
pub fn resolve_path(
    start: ResolvedPath,
    path: &[String],
    spec: &EngineSpec,
    types: &TypeSystem,
) -> Result<ResolvedPath> {
    path.iter().try_fold(start, |current, segment| {
        let mut next = ResolvedPath {
            type_id: TypeUnion::empty(),
            multiple: current.multiple,
            optional: current.optional,
        };
        let mut found = false;

        for member in &current.type_id {
            for owner in types.lineage(member) {
                let property = spec
                    .type_spec(&owner)
                    .and_then(|t| t.properties.get(segment));
                if let Some(property) = property {
                    found = true;
                    next.type_id = next.type_id.union(&property.type_id);
                    next.multiple |= property.multiple;
                    next.optional |= property.optional;
                }
            }
        }

        if !found {
            return Err(EngineError::InvalidPath {
                path: path.to_vec(),
            });
        }
        Ok(next)
    })
}
