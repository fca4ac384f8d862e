//! `zipdl fetch <archive>` – stream a list of URLs into one ZIP archive.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use zipdl_core::config::ZipdlConfig;
use zipdl_core::control::DownloadControl;
use zipdl_core::descriptor::load_manifest;
use zipdl_core::{FileDescriptor, ZipStreamDownload};

#[derive(Debug)]
pub struct FetchArgs {
    pub archive: PathBuf,
    pub files: Vec<FileDescriptor>,
    pub manifest: Option<PathBuf>,
    pub rate_limit_ms: Option<u64>,
}

/// Builds the ordered descriptor list: `--file` entries first, then the manifest.
pub fn collect_files(args: &FetchArgs) -> Result<Vec<FileDescriptor>> {
    let mut files = args.files.clone();
    if let Some(path) = &args.manifest {
        let listed = load_manifest(path)?;
        files.extend(listed);
    }
    Ok(files)
}

pub async fn run_fetch(cfg: &ZipdlConfig, args: FetchArgs) -> Result<()> {
    let files = collect_files(&args)?;
    let rate_limit = args
        .rate_limit_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| cfg.rate_limit());

    if files.is_empty() {
        println!("No files given; writing an empty archive.");
    }

    let control = DownloadControl::new();
    let on_ctrl_c = control.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, aborting download...");
            on_ctrl_c.request_abort();
        }
    });

    let summary = ZipStreamDownload::new(files)
        .rate_limit(rate_limit)
        .http_options(cfg.http_options())
        .write_buffer_bytes(cfg.write_buffer_bytes)
        .control(control)
        .on_progress(Box::new(|current, total, file| {
            println!("[{current}/{total}] {}", file.name);
        }))
        .to_file(&args.archive)
        .await
        .with_context(|| format!("download into {} failed", args.archive.display()))?;

    println!(
        "Saved {} ({} entries, {} bytes)",
        args.archive.display(),
        summary.entries,
        summary.bytes_written
    );
    Ok(())
}
