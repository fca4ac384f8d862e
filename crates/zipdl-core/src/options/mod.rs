//! Persisted application options with change notification.
//!
//! `OptionsStore` owns the current options and an injected persistence
//! backend. Every effective save stamps the crate version; a save whose result
//! equals what was last persisted is skipped entirely. Subscribers get a
//! `watch` receiver whose value increments on load and on each effective save.

mod backend;

pub use backend::{JsonFileBackend, MemoryBackend, OptionsBackend, STORAGE_KEY};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Application options as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_control_panel: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_extensions: Option<Vec<String>>,
    /// Version of the program that last wrote the options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// One settable option and its new value (`None` clears it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppOption {
    Theme(Option<String>),
    ShowControlPanel(Option<bool>),
    DisabledExtensions(Option<Vec<String>>),
}

impl AppOptions {
    fn apply(&mut self, option: AppOption) {
        match option {
            AppOption::Theme(v) => self.theme = v,
            AppOption::ShowControlPanel(v) => self.show_control_panel = v,
            AppOption::DisabledExtensions(v) => self.disabled_extensions = v,
        }
    }

    /// Stored values take precedence; fields missing in `stored` keep `self`'s.
    fn merged_with(mut self, stored: AppOptions) -> Self {
        if stored.theme.is_some() {
            self.theme = stored.theme;
        }
        if stored.show_control_panel.is_some() {
            self.show_control_panel = stored.show_control_panel;
        }
        if stored.disabled_extensions.is_some() {
            self.disabled_extensions = stored.disabled_extensions;
        }
        if stored.version.is_some() {
            self.version = stored.version;
        }
        self
    }
}

/// Owned options cache over a persistence backend.
pub struct OptionsStore<B: OptionsBackend> {
    backend: B,
    current: AppOptions,
    previous: AppOptions,
    version: String,
    changes: watch::Sender<u64>,
}

impl<B: OptionsBackend> OptionsStore<B> {
    /// Load options from `backend`, stamping saves with this crate's version.
    pub fn load(backend: B) -> Self {
        Self::load_with_version(backend, env!("CARGO_PKG_VERSION"))
    }

    pub fn load_with_version(backend: B, version: impl Into<String>) -> Self {
        let (changes, _) = watch::channel(0);
        let mut store = Self {
            backend,
            current: AppOptions::default(),
            previous: AppOptions::default(),
            version: version.into(),
            changes,
        };
        store.reload();
        store
    }

    /// Re-read the backend, merging stored values over the current ones.
    pub fn reload(&mut self) {
        let stored = self.backend.load();
        self.current = std::mem::take(&mut self.current).merged_with(stored);
        self.previous = self.current.clone();
        tracing::info!("app options loaded: {:?}", self.current);
        self.notify();
    }

    pub fn get(&self) -> &AppOptions {
        &self.current
    }

    pub fn theme_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.current.theme.as_deref().unwrap_or(default)
    }

    pub fn show_control_panel_or(&self, default: bool) -> bool {
        self.current.show_control_panel.unwrap_or(default)
    }

    /// Set one option and persist. Returns whether anything was written.
    pub fn set(&mut self, option: AppOption) -> Result<bool> {
        self.current.apply(option);
        self.save()
    }

    /// Receiver whose value changes on every load and effective save.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn save(&mut self) -> Result<bool> {
        let mut next = self.current.clone();
        next.version = Some(self.version.clone());

        if next == self.previous {
            return Ok(false);
        }

        self.backend.save(&next)?;
        self.current = next;
        self.previous = self.current.clone();
        tracing::debug!("app options saved: {:?}", self.current);
        self.notify();
        Ok(true)
    }

    fn notify(&self) {
        self.changes.send_modify(|n| *n += 1);
    }
}
