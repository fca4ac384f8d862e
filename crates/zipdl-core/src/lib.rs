pub mod config;
pub mod logging;

pub mod control;
pub mod descriptor;
pub mod encoder;
pub mod error;
pub mod fetch;
pub mod options;
pub mod pipeline;
pub mod producer;
pub mod progress;
pub mod sink;

pub use descriptor::FileDescriptor;
pub use error::{ErrorKind, FetchError, ZipStreamError};
pub use pipeline::{zip_stream_download, DownloadSummary, ZipStreamDownload};
pub use progress::{ProgressCallback, ProgressState};
