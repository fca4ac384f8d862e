//! JSON manifest of files to download.
//!
//! A manifest is a JSON array of objects with `filename` (or `name`) and `url`:
//!
//! ```json
//! [{ "filename": "a.txt", "url": "https://example.com/a" }]
//! ```

use anyhow::{Context, Result};
use std::path::Path;

use super::FileDescriptor;

/// Reads a manifest file. Order of the array is the order of the archive.
pub fn load_manifest(path: &Path) -> Result<Vec<FileDescriptor>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read manifest: {}", path.display()))?;
    let files: Vec<FileDescriptor> = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse manifest: {}", path.display()))?;
    tracing::debug!(count = files.len(), "loaded manifest {}", path.display());
    Ok(files)
}
