//! Per-download progress: how many files have been fetched out of how many.

use crate::descriptor::FileDescriptor;

/// Callback invoked after each file is handed to the encoder, with
/// `(completed, total, descriptor)`. Runs synchronously on the producer's
/// flow, so it should return quickly.
pub type ProgressCallback = Box<dyn FnMut(usize, usize, &FileDescriptor) + Send>;

/// Snapshot of download progress (count of files, not bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    /// Files fetched successfully so far.
    pub current: usize,
    /// Number of files in the download.
    pub total: usize,
    /// Most recently fetched file.
    pub last_completed: Option<FileDescriptor>,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            current: 0,
            total,
            last_completed: None,
        }
    }

    /// Records one more completed file. `current` never exceeds `total`.
    pub(crate) fn advance(&mut self, descriptor: &FileDescriptor) {
        debug_assert!(self.current < self.total, "progress advanced past total");
        self.current = (self.current + 1).min(self.total);
        self.last_completed = Some(descriptor.clone());
    }

    pub fn is_complete(&self) -> bool {
        self.current == self.total
    }

    /// Fraction complete in [0.0, 1.0]. An empty download counts as complete.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.current as f64 / self.total as f64).min(1.0)
    }
}
