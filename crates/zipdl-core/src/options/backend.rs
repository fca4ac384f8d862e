//! Persistence backends for `AppOptions`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::AppOptions;

/// Fixed key the options object is stored under.
pub const STORAGE_KEY: &str = "zipdl";

/// Where the options object lives between runs.
pub trait OptionsBackend: Send {
    /// Stored options, or defaults when nothing (valid) is stored.
    fn load(&self) -> AppOptions;

    fn save(&mut self, options: &AppOptions) -> Result<()>;
}

/// JSON file named after the storage key, e.g. `~/.local/state/zipdl/zipdl.json`.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default path under the XDG state dir.
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("zipdl")?;
        Ok(xdg_dirs.get_state_file(format!("{STORAGE_KEY}.json")))
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OptionsBackend for JsonFileBackend {
    fn load(&self) -> AppOptions {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return AppOptions::default(),
            Err(e) => {
                tracing::warn!("read options {}: {}", self.path.display(), e);
                return AppOptions::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(opts) => opts,
            Err(e) => {
                tracing::warn!("ignoring unparsable options {}: {}", self.path.display(), e);
                AppOptions::default()
            }
        }
    }

    fn save(&mut self, options: &AppOptions) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string(options).context("serialize options")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write options: {}", self.path.display()))?;
        Ok(())
    }
}

/// Keeps options in memory; counts writes. Useful for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    stored: Option<AppOptions>,
    writes: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stored(options: AppOptions) -> Self {
        Self {
            stored: Some(options),
            writes: 0,
        }
    }

    /// Number of `save` calls that reached this backend.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn stored(&self) -> Option<&AppOptions> {
        self.stored.as_ref()
    }
}

impl OptionsBackend for MemoryBackend {
    fn load(&self) -> AppOptions {
        self.stored.clone().unwrap_or_default()
    }

    fn save(&mut self, options: &AppOptions) -> Result<()> {
        self.stored = Some(options.clone());
        self.writes += 1;
        Ok(())
    }
}
