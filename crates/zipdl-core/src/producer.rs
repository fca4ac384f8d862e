//! Pull-driven archive producer.
//!
//! The encoder drives production: each time it is ready for another entry it
//! issues a demand carrying an `EntrySlot`, and the source answers by filling
//! the slot (one entry) or closing it (end of input). `ArchiveProducer` is the
//! HTTP-backed source: one GET per demand, in list order, followed by the
//! rate-limit pause before the demand completes.

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

use crate::control::DownloadControl;
use crate::descriptor::FileDescriptor;
use crate::encoder::ArchiveEntry;
use crate::error::ZipStreamError;
use crate::fetch::HttpFetcher;
use crate::progress::{ProgressCallback, ProgressState};

/// Outcome of a successful pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulled {
    /// One entry was placed in the slot.
    Entry,
    /// The source is exhausted; the slot was closed.
    End,
}

/// Where a source delivers the answer to one pull demand.
#[derive(Debug)]
pub struct EntrySlot {
    tx: oneshot::Sender<Option<ArchiveEntry>>,
}

/// Encoder-side half of an `EntrySlot`.
pub(crate) type SlotReceiver = oneshot::Receiver<Option<ArchiveEntry>>;

impl EntrySlot {
    pub(crate) fn new() -> (Self, SlotReceiver) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Hands `entry` to the encoder. Fails with `Aborted` when the encoder is
    /// gone (the pipeline is already shutting down).
    pub fn enqueue(self, entry: ArchiveEntry) -> Result<(), ZipStreamError> {
        self.tx
            .send(Some(entry))
            .map_err(|_| ZipStreamError::Aborted)
    }

    /// Signals end of input: no further entries will be produced.
    pub fn close(self) {
        let _ = self.tx.send(None);
    }
}

/// A lazily-pulled source of archive entries.
///
/// `pull` is never called again before the previous call has completed.
pub trait EntrySource {
    fn pull(&mut self, slot: EntrySlot) -> impl Future<Output = Result<Pulled, ZipStreamError>> + Send;
}

/// Fetches each descriptor over HTTP on demand and enforces a minimum gap
/// between consecutive fetches.
pub struct ArchiveProducer {
    files: std::vec::IntoIter<FileDescriptor>,
    fetcher: HttpFetcher,
    rate_limit: Duration,
    progress: ProgressState,
    on_progress: Option<ProgressCallback>,
    control: DownloadControl,
}

impl ArchiveProducer {
    pub fn new(files: Vec<FileDescriptor>, fetcher: HttpFetcher, rate_limit: Duration) -> Self {
        let total = files.len();
        Self {
            files: files.into_iter(),
            fetcher,
            rate_limit,
            progress: ProgressState::new(total),
            on_progress: None,
            control: DownloadControl::default(),
        }
    }

    pub fn with_progress(mut self, on_progress: Option<ProgressCallback>) -> Self {
        self.on_progress = on_progress;
        self
    }

    pub fn with_control(mut self, control: DownloadControl) -> Self {
        self.control = control;
        self
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }
}

impl EntrySource for ArchiveProducer {
    async fn pull(&mut self, slot: EntrySlot) -> Result<Pulled, ZipStreamError> {
        if self.control.is_aborted() {
            return Err(ZipStreamError::Aborted);
        }

        let Some(file) = self.files.next() else {
            tracing::debug!(total = self.progress.total, "all files fetched");
            slot.close();
            return Ok(Pulled::End);
        };

        let start = Instant::now();
        tracing::debug!("start downloading {} from {}", file.name, file.source_location);
        let body = self.fetcher.fetch(&file).await?;
        slot.enqueue(ArchiveEntry::new(file.name.clone(), body))?;

        self.progress.advance(&file);
        if let Some(cb) = self.on_progress.as_mut() {
            cb(self.progress.current, self.progress.total, &file);
        }
        tracing::debug!(
            current = self.progress.current,
            total = self.progress.total,
            "finished requesting {} in {}ms",
            file.name,
            start.elapsed().as_millis()
        );

        if !self.rate_limit.is_zero() {
            tokio::time::sleep(self.rate_limit).await;
        }
        Ok(Pulled::Entry)
    }
}
