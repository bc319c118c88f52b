use imgest_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // File logging when the state dir is writable, stderr otherwise.
    let _target = logging::init();

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("imgest error: {:#}", err);
        std::process::exit(1);
    }
}
