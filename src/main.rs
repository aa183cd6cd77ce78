//! Gargs: run commands built from lines of stdin, optionally in parallel.
//!
//! This is the main entry point for the `gargs` CLI. It parses arguments,
//! runs the pipeline, and turns the outcome into a process exit code: the
//! highest exit status among the commands, or the code of a fatal error.

mod cli;
mod config;
mod dispatch;
mod engine;
pub mod error;
pub mod exit_codes;
mod generator;
mod logging;
mod orchestrator;
mod run;
pub mod template;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init();

    match run::execute(&cli) {
        Ok(status) => ExitCode::from(exit_codes::clamp(status)),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(exit_codes::clamp(err.exit_code()))
        }
    }
}
