use perfect_retry_core::logging::{self, LogTarget};

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Parse CLI and dispatch; logging is set up inside once --log-file is known.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("perfect-retry error: {:#}", err);
        std::process::exit(1);
    }
}

/// Log to the XDG state file when asked, otherwise to stderr.
pub(crate) fn init_logging(log_file: bool) {
    let target = if !log_file {
        LogTarget::Stderr
    } else {
        match logging::log_file_path() {
            Ok(path) => LogTarget::File(path),
            Err(err) => {
                eprintln!("perfect-retry: no log file location ({:#}), logging to stderr", err);
                LogTarget::Stderr
            }
        }
    };
    logging::init(target);
}
