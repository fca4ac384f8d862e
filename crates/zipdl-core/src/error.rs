//! Error taxonomy for the download-and-archive pipeline.
//!
//! Every failure of a download surfaces as one `ZipStreamError`; `kind()`
//! maps it onto the coarse categories callers usually branch on.

use std::io;

/// Why a single file could not be fetched.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, TLS, timeout).
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    /// Server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u16),
}

/// Terminal failure of a zip-stream download. Nothing is retried and no
/// partial archive is delivered.
#[derive(Debug, thiserror::Error)]
pub enum ZipStreamError {
    #[error("invalid file #{index}: {reason}")]
    InvalidDescriptor { index: usize, reason: String },

    #[error("building HTTP client failed")]
    Client(#[source] FetchError),

    #[error("fetching {name} from {url} failed")]
    Fetch {
        name: String,
        url: String,
        #[source]
        source: FetchError,
    },

    /// Body of an entry could not be read to completion.
    #[error("reading body of {name} failed")]
    Body {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Archive outgrew what a ZIP32 container can describe.
    #[error("archive limit exceeded: {0}")]
    Limit(&'static str),

    #[error("writing archive failed")]
    Sink(#[source] io::Error),

    #[error("download aborted")]
    Aborted,
}

/// Coarse classification of a `ZipStreamError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Fetch,
    Encoding,
    Sink,
    Aborted,
}

impl ZipStreamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ZipStreamError::InvalidDescriptor { .. } => ErrorKind::InvalidInput,
            ZipStreamError::Client(_) | ZipStreamError::Fetch { .. } => ErrorKind::Fetch,
            ZipStreamError::Body { .. } | ZipStreamError::Limit(_) => ErrorKind::Encoding,
            ZipStreamError::Sink(_) => ErrorKind::Sink,
            ZipStreamError::Aborted => ErrorKind::Aborted,
        }
    }

    /// HTTP status of a failed fetch, if the server answered at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ZipStreamError::Fetch {
                source: FetchError::Status(code),
                ..
            } => Some(*code),
            _ => None,
        }
    }
}
