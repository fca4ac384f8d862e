//! CLI command handlers, one file per command.

mod fetch;
mod options;

pub use fetch::{run_fetch, FetchArgs};
pub use options::{run_options_set, run_options_show, OptionKey};
