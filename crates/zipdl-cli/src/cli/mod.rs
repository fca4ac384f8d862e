//! CLI for zipdl.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use zipdl_core::config;
use zipdl_core::FileDescriptor;

use commands::{run_fetch, run_options_set, run_options_show, FetchArgs, OptionKey};

/// Top-level CLI for zipdl.
#[derive(Debug, Parser)]
#[command(name = "zipdl")]
#[command(about = "zipdl: download many URLs into one streamed ZIP archive", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch files one at a time and stream them into a ZIP archive.
    Fetch {
        /// Path of the archive to write (e.g. bundle.zip).
        archive: PathBuf,

        /// Archive entry and its source, as NAME=URL. Repeatable; order is kept.
        #[arg(long = "file", value_name = "NAME=URL", value_parser = FileDescriptor::parse_pair)]
        files: Vec<FileDescriptor>,

        /// JSON manifest: array of {"filename", "url"} objects, appended after --file entries.
        #[arg(long, value_name = "PATH")]
        manifest: Option<PathBuf>,

        /// Minimum delay between fetches in milliseconds (overrides config).
        #[arg(long, value_name = "MS")]
        rate_limit_ms: Option<u64>,
    },

    /// Show or change persisted application options.
    Options {
        #[command(subcommand)]
        action: OptionsAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum OptionsAction {
    /// Print the stored options as JSON.
    Show,
    /// Set one option. An empty VALUE clears it.
    Set {
        #[arg(value_enum)]
        key: OptionKey,
        value: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Fetch {
                archive,
                files,
                manifest,
                rate_limit_ms,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let args = FetchArgs {
                    archive,
                    files,
                    manifest,
                    rate_limit_ms,
                };
                run_fetch(&cfg, args).await?;
            }
            CliCommand::Options { action } => match action {
                OptionsAction::Show => run_options_show()?,
                OptionsAction::Set { key, value } => run_options_set(key, &value)?,
            },
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
