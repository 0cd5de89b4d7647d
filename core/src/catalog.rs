//! Loading an [`EntityCatalog`] supplied by the host as a JSON file.

use std::path::Path;

use quill_protocol::EntityCatalog;

use crate::error::QuillErr;
use crate::error::Result;

/// Read a catalog from `path`.
///
/// The catalog is owned by whoever wrote the file; this is a one-shot read
/// with no caching or refresh.
pub fn load_catalog(path: &Path) -> Result<EntityCatalog> {
    let contents = std::fs::read_to_string(path)?;
    let catalog: EntityCatalog =
        serde_json::from_str(&contents).map_err(|source| QuillErr::CatalogParse {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(
        "loaded catalog from {}: {} characters, {} world settings, {} memos, {} chapters",
        path.display(),
        catalog.characters.len(),
        catalog.world_settings.len(),
        catalog.memos.len(),
        catalog.chapters.len()
    );
    Ok(catalog)
}
