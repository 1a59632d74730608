//! JSON snapshot persistence for file-backed stores.
//!
//! A snapshot is the whole graph serialized as one JSON document. Writes go
//! through a temporary file in the target directory followed by an atomic
//! rename, so a crash mid-write leaves the previous snapshot intact.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::store::GraphStore;

/// Loads a snapshot from `path`. A missing file yields an empty store, which
/// is how a fresh `file:` URI bootstraps itself.
pub fn load(path: &Path) -> Result<GraphStore> {
    if !path.exists() {
        debug!(path = %path.display(), "no snapshot on disk, starting empty");
        return Ok(GraphStore::new());
    }
    let bytes = fs::read(path)?;
    let store: GraphStore = serde_json::from_slice(&bytes)
        .map_err(|err| CatalogError::Snapshot(format!("{}: {err}", path.display())))?;
    debug!(
        path = %path.display(),
        nodes = store.node_count(None),
        edges = store.edge_count(),
        "snapshot loaded"
    );
    Ok(store)
}

/// Writes a snapshot of `store` to `path` atomically.
pub fn save(store: &GraphStore, path: &Path) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir)?;
    }
    let dir = parent.unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer(&mut tmp, store)
        .map_err(|err| CatalogError::Snapshot(err.to_string()))?;
    tmp.flush()?;
    tmp.persist(path)
        .map_err(|err| CatalogError::Io(err.error))?;
    debug!(path = %path.display(), "snapshot written");
    Ok(())
}
