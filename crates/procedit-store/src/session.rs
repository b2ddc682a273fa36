//! Opening an editing session from documents on disk

use std::path::Path;
use std::sync::Arc;

use procedit_core::{Catalog, EngineState, GuardPolicy};

use crate::errors::{engine_error, Result};
use crate::loader::{load_config_file, load_spec_file};

/// Load an engine specification and derive its catalog
///
/// # Errors
/// Load errors, or the catalog error (`UnknownType`, `CycleDetected`,
/// `InvalidPattern`) wrapped as the source.
pub fn load_catalog(spec_path: &Path) -> Result<Arc<Catalog>> {
    let spec = load_spec_file(spec_path)?;
    let catalog = Catalog::load(spec).map_err(|e| engine_error("load_catalog", e))?;
    Ok(Arc::new(catalog))
}

/// Load both documents and construct a fully validated engine state
///
/// # Errors
/// Load errors, catalog errors, or construction errors (unknown callables
/// or parameters, unresolved references).
pub fn open_session(
    spec_path: &Path,
    config_path: &Path,
    policy: &dyn GuardPolicy,
) -> Result<EngineState> {
    let catalog = load_catalog(spec_path)?;
    let config = load_config_file(config_path)?;
    let state = EngineState::from_config(catalog, &config, policy)
        .map_err(|e| engine_error("construct", e))?;
    tracing::info!(
        process = %config.name,
        nodes = state.store.len(),
        "session opened"
    );
    Ok(state)
}
