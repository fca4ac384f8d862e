//! File-save destination for the archive stream.
//!
//! Bytes go to `<archive>.part`; `commit` syncs and atomically renames it to
//! the final name, `discard` removes it. A failed download therefore never
//! leaves a file under the requested name.

use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::error::ZipStreamError;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.zip` → `a.zip.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Buffered async writer for an archive being saved to disk.
pub struct FileSink {
    file: BufWriter<File>,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

impl FileSink {
    /// Create (or truncate) the temp file next to `final_path`. Parent
    /// directories are created as needed.
    pub async fn create(final_path: &Path, buffer_bytes: Option<usize>) -> Result<Self, ZipStreamError> {
        if let Some(parent) = final_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ZipStreamError::Sink)?;
        }
        let temp_path = temp_path(final_path);
        let file = File::create(&temp_path)
            .await
            .map_err(ZipStreamError::Sink)?;
        let file = match buffer_bytes {
            Some(cap) => BufWriter::with_capacity(cap, file),
            None => BufWriter::new(file),
        };
        tracing::debug!(path = %temp_path.display(), "archive sink opened");
        Ok(Self {
            file,
            temp_path,
            final_path: final_path.to_path_buf(),
            written: 0,
        })
    }

    /// Bytes accepted so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush, fsync and rename the temp file to the final path. If any step
    /// fails the temp file is removed before the error is returned.
    pub async fn commit(self) -> Result<PathBuf, ZipStreamError> {
        let FileSink {
            mut file,
            temp_path,
            final_path,
            ..
        } = self;

        let synced = match file.flush().await {
            Ok(()) => file.get_ref().sync_all().await,
            Err(e) => Err(e),
        };
        drop(file);
        let persisted = match synced {
            Ok(()) => tokio::fs::rename(&temp_path, &final_path).await,
            Err(e) => Err(e),
        };

        match persisted {
            Ok(()) => Ok(final_path),
            Err(e) => {
                remove_temp(&temp_path).await;
                Err(ZipStreamError::Sink(e))
            }
        }
    }

    /// Close and delete the temp file. Errors are logged, not returned: the
    /// download has already failed.
    pub async fn discard(self) {
        drop(self.file);
        remove_temp(&self.temp_path).await;
    }
}

async fn remove_temp(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!("could not remove {}: {}", path.display(), e);
        }
    }
}

impl AsyncWrite for FileSink {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let poll = Pin::new(&mut self.file).poll_write(cx, buf);
        if let Poll::Ready(Ok(n)) = poll {
            self.written += n as u64;
        }
        poll
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.file).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.file).poll_shutdown(cx)
    }
}
