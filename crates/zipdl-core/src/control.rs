//! Abort control for a running download.
//!
//! A `DownloadControl` is handed to the pipeline; anyone holding a clone (e.g.
//! the CLI's Ctrl-C handler) can request abort. The producer checks the token
//! before each fetch and the encoder between body chunks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort token for one download. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct DownloadControl {
    aborted: Arc<AtomicBool>,
}

impl DownloadControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request abort. The pipeline stops issuing fetches and fails with
    /// `ZipStreamError::Aborted` at its next check.
    pub fn request_abort(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }
}
