//! Entry point for the `windbreaks` binary.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use windbreaks_cli::CliError;

fn main() -> ExitCode {
    env_logger::init();
    match windbreaks_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("windbreaks: {err}");
            ExitCode::FAILURE
        }
    }
}
