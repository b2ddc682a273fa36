//! Catalog and engine state
//!
//! `Catalog` is everything derived once from an engine specification. It is
//! immutable and shared between states. `EngineState` is the caller-owned
//! editing state every command transforms.

use std::sync::Arc;

use crate::errors::Result;
use crate::model::{ContentKey, EngineSpec, ProcessConfig};
use crate::ops::{construct, export, ContentStore};
use crate::policy::GuardPolicy;
use crate::rules::{revalidate_all, LiteralValidator};
use crate::types::TypeSystem;

/// Engine specification plus its derived type closure and literal validator
#[derive(Debug, Clone)]
pub struct Catalog {
    spec: EngineSpec,
    types: TypeSystem,
    literals: LiteralValidator,
}

impl Catalog {
    /// Derive the type closure and compile literal patterns
    ///
    /// # Errors
    /// * `UnknownType` / `TypeCycleDetected` - malformed type hierarchy
    /// * `InvalidPattern` - a type pattern does not compile
    pub fn load(spec: EngineSpec) -> Result<Self> {
        let types = TypeSystem::build(&spec.types)?;
        let literals = LiteralValidator::new(&spec)?;
        tracing::info!(
            types = spec.types.len(),
            processes = spec.processes.len(),
            actions = spec.actions.len(),
            functions = spec.functions.len(),
            "catalog loaded"
        );
        Ok(Self {
            spec,
            types,
            literals,
        })
    }

    pub fn spec(&self) -> &EngineSpec {
        &self.spec
    }

    pub fn types(&self) -> &TypeSystem {
        &self.types
    }

    pub fn literals(&self) -> &LiteralValidator {
        &self.literals
    }
}

/// Complete editing state: catalog, content tree and selection
#[derive(Debug, Clone)]
pub struct EngineState {
    pub catalog: Arc<Catalog>,
    pub store: ContentStore,
    /// Key of the Process node
    pub root: ContentKey,
    pub selection: Option<ContentKey>,
}

impl EngineState {
    /// Construct a tree from a configuration and fully validate it
    ///
    /// # Errors
    /// Any construction contract violation (unknown callable or parameter,
    /// unresolved reference coordinates, missing output declaration).
    pub fn from_config(
        catalog: Arc<Catalog>,
        config: &ProcessConfig,
        policy: &dyn GuardPolicy,
    ) -> Result<Self> {
        let mut store = ContentStore::new();
        let root = construct(&mut store, &catalog, config)?;
        revalidate_all(&mut store, &catalog, root, policy)?;
        tracing::debug!(root = %root, nodes = store.len(), "engine state constructed");
        Ok(Self {
            catalog,
            store,
            root,
            selection: None,
        })
    }

    /// Export the current tree in canonical configuration form
    ///
    /// # Errors
    /// Lookup failures if the tree is inconsistent.
    pub fn export(&self) -> Result<ProcessConfig> {
        export(&self.store, &self.catalog, self.root)
    }

    pub fn spec(&self) -> &EngineSpec {
        self.catalog.spec()
    }
}
