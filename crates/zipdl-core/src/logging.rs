//! Log setup for the CLI: append to the XDG state log, or stderr when that
//! file cannot be opened.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info,zipdl_core=debug,zipdl=debug";

/// Where log lines end up after `init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    File(PathBuf),
    Stderr,
}

/// `~/.local/state/zipdl/zipdl.log`, creating the directory if needed.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("zipdl")?;
    xdg_dirs
        .place_state_file("zipdl.log")
        .context("create log directory")
}

/// Installs the global subscriber. Never fails: when the log file is
/// unavailable, lines go to stderr and the reason is logged there.
pub fn init() -> LogDestination {
    match open_log_file() {
        Ok((file, path)) => {
            install(SharedLogFile(file));
            tracing::info!("zipdl logging initialized at {}", path.display());
            LogDestination::File(path)
        }
        Err(err) => {
            install(io::stderr);
            tracing::warn!("log file unavailable, logging to stderr: {:#}", err);
            LogDestination::Stderr
        }
    }
}

fn open_log_file() -> Result<(File, PathBuf)> {
    let path = log_file_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;
    Ok((file, path))
}

fn install<W>(writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Hands each event a clone of the log file handle.
struct SharedLogFile(File);

impl<'a> MakeWriter<'a> for SharedLogFile {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(LogWriter::File)
            .unwrap_or(LogWriter::Stderr)
    }
}

/// File handle, or stderr when the handle could not be cloned.
enum LogWriter {
    File(File),
    Stderr,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogWriter::File(f) => f.write(buf),
            LogWriter::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogWriter::File(f) => f.flush(),
            LogWriter::Stderr => io::stderr().lock().flush(),
        }
    }
}
