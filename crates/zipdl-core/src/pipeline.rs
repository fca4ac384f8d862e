//! Pipe orchestrator: producer → encoder → sink, one terminal result.
//!
//! Producer and encoder run concurrently inside one task. The encoder asks for
//! the next entry only after the previous one has been written in full, and
//! the producer answers one demand at a time, so at most one fetch is in
//! flight and the sink's pace bounds how much is ever buffered. The first
//! failure on either side ends the whole download; whatever the other side
//! was doing (including an in-flight fetch) is dropped.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;

use crate::config::{HttpOptions, DEFAULT_RATE_LIMIT_MS};
use crate::control::DownloadControl;
use crate::descriptor::{prepare_descriptors, FileDescriptor};
use crate::encoder::ZipEncoder;
use crate::error::ZipStreamError;
use crate::fetch::HttpFetcher;
use crate::producer::{ArchiveProducer, EntrySlot, EntrySource, Pulled};
use crate::progress::ProgressCallback;
use crate::sink::FileSink;

/// Result of a completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Number of entries in the archive.
    pub entries: usize,
    /// Size of the archive in bytes.
    pub bytes_written: u64,
    /// Final archive path (file downloads only).
    pub path: Option<PathBuf>,
}

/// Builder for one zip-stream download.
///
/// ```no_run
/// # async fn demo() -> Result<(), zipdl_core::ZipStreamError> {
/// use zipdl_core::{FileDescriptor, ZipStreamDownload};
///
/// let files = vec![FileDescriptor::new("a.txt", "https://example.com/a")];
/// ZipStreamDownload::new(files)
///     .on_progress(Box::new(|done, total, f| println!("{done}/{total} {}", f.name)))
///     .to_file("bundle.zip")
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ZipStreamDownload {
    files: Vec<FileDescriptor>,
    rate_limit: Duration,
    on_progress: Option<ProgressCallback>,
    http: HttpOptions,
    fetcher: Option<HttpFetcher>,
    control: DownloadControl,
    write_buffer_bytes: Option<usize>,
}

impl ZipStreamDownload {
    pub fn new(files: Vec<FileDescriptor>) -> Self {
        Self {
            files,
            rate_limit: Duration::from_millis(DEFAULT_RATE_LIMIT_MS),
            on_progress: None,
            http: HttpOptions::default(),
            fetcher: None,
            control: DownloadControl::default(),
            write_buffer_bytes: None,
        }
    }

    /// Minimum gap between the starts of two consecutive fetches (default 1s).
    pub fn rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn on_progress(mut self, cb: ProgressCallback) -> Self {
        self.on_progress = Some(cb);
        self
    }

    pub fn http_options(mut self, http: HttpOptions) -> Self {
        self.http = http;
        self
    }

    /// Use an existing fetcher (shared connection pool) instead of building one
    /// from the HTTP options.
    pub fn fetcher(mut self, fetcher: HttpFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn control(mut self, control: DownloadControl) -> Self {
        self.control = control;
        self
    }

    pub fn write_buffer_bytes(mut self, bytes: Option<usize>) -> Self {
        self.write_buffer_bytes = bytes;
        self
    }

    /// Streams the archive into `path`. The file only appears once the whole
    /// archive has been written. When the download fails with an error, the
    /// `.part` temp file is removed as well; a panic in the progress callback
    /// unwinds past the cleanup and leaves it in place.
    pub async fn to_file(self, path: impl AsRef<Path>) -> Result<DownloadSummary, ZipStreamError> {
        let path = path.as_ref();
        let buffer = self.write_buffer_bytes;
        let (producer, control) = self.into_producer()?;

        let mut sink = FileSink::create(path, buffer).await?;
        tracing::info!("start zip archive: {}", path.display());

        let result = run_pipeline(producer, &mut sink, control)
            .await
            .map(|(_, summary)| summary);
        match result {
            Ok(mut summary) => {
                let final_path = sink.commit().await.inspect_err(|err| {
                    tracing::warn!("zip archive {} failed: {}", path.display(), err);
                })?;
                tracing::info!(
                    entries = summary.entries,
                    bytes = summary.bytes_written,
                    "zip archive saved: {}",
                    final_path.display()
                );
                summary.path = Some(final_path);
                Ok(summary)
            }
            Err(err) => {
                tracing::warn!("zip archive {} failed: {}", path.display(), err);
                sink.discard().await;
                Err(err)
            }
        }
    }

    /// Streams the archive into an arbitrary async writer and returns it once
    /// everything has been flushed.
    pub async fn to_writer<W>(self, writer: W) -> Result<(W, DownloadSummary), ZipStreamError>
    where
        W: AsyncWrite + Unpin,
    {
        let (producer, control) = self.into_producer()?;
        run_pipeline(producer, writer, control).await
    }

    fn into_producer(self) -> Result<(ArchiveProducer, DownloadControl), ZipStreamError> {
        let files = prepare_descriptors(self.files)?;
        let fetcher = match self.fetcher {
            Some(f) => f,
            None => HttpFetcher::new(&self.http).map_err(ZipStreamError::Client)?,
        };
        let producer = ArchiveProducer::new(files, fetcher, self.rate_limit)
            .with_progress(self.on_progress)
            .with_control(self.control.clone());
        Ok((producer, self.control))
    }
}

/// Downloads `files` into a ZIP archive at `zip_path`, one file at a time with
/// at least `rate_limit` between fetches.
pub async fn zip_stream_download(
    zip_path: impl AsRef<Path>,
    files: Vec<FileDescriptor>,
    on_progress: Option<ProgressCallback>,
    rate_limit: Duration,
) -> Result<DownloadSummary, ZipStreamError> {
    let mut download = ZipStreamDownload::new(files).rate_limit(rate_limit);
    if let Some(cb) = on_progress {
        download = download.on_progress(cb);
    }
    download.to_file(zip_path).await
}

/// Drives any entry source through the encoder into `writer`.
///
/// Runs producer and encoder side by side. The first error from either side
/// is returned and the other side is dropped where it stands.
pub async fn run_pipeline<S, W>(
    mut source: S,
    writer: W,
    control: DownloadControl,
) -> Result<(W, DownloadSummary), ZipStreamError>
where
    S: EntrySource,
    W: AsyncWrite + Unpin,
{
    let (demand_tx, mut demand_rx) = mpsc::channel::<EntrySlot>(1);

    let produce = async move {
        while let Some(slot) = demand_rx.recv().await {
            if source.pull(slot).await? == Pulled::End {
                break;
            }
        }
        Ok::<(), ZipStreamError>(())
    };

    let encode = async move {
        let mut encoder = ZipEncoder::new(writer).with_control(control);
        loop {
            let (slot, answer) = EntrySlot::new();
            if demand_tx.send(slot).await.is_err() {
                return Err(ZipStreamError::Aborted);
            }
            match answer.await {
                Ok(Some(entry)) => {
                    let size = encoder.write_entry(entry).await?;
                    tracing::trace!(size, total = encoder.bytes_written(), "entry written");
                }
                Ok(None) => break,
                // source dropped the slot without answering
                Err(_) => return Err(ZipStreamError::Aborted),
            }
        }
        let entries = encoder.entry_count();
        let (writer, bytes_written) = encoder.finish().await?;
        let summary = DownloadSummary {
            entries,
            bytes_written,
            path: None,
        };
        Ok::<(W, DownloadSummary), ZipStreamError>((writer, summary))
    };

    let ((), done) = tokio::try_join!(produce, encode)?;
    Ok(done)
}
