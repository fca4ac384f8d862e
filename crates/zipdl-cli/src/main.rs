use zipdl_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    let destination = logging::init();
    tracing::debug!(?destination, "logging ready");

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("zipdl error: {:#}", err);
        std::process::exit(1);
    }
}
