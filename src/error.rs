//! Error types for the gargs CLI.
//!
//! Uses thiserror for derive macros. Every variant here is fatal to the run;
//! a command exiting non-zero is not an error, it only feeds the final exit
//! status.

use crate::exit_codes;
use crate::template::TemplateError;
use std::io;
use thiserror::Error;

/// Main error type for gargs operations.
#[derive(Error, Debug)]
pub enum GargsError {
    /// Flags are missing, conflicting, or out of range.
    #[error("{0}")]
    Config(String),

    /// Stdin is attached to a terminal instead of a pipe or file.
    #[error("expecting input on STDIN")]
    MissingInput,

    /// The command pattern could not be compiled or rendered.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Reading the input stream failed somewhere other than end-of-stream.
    #[error("failed to read input: {0}")]
    InputRead(#[source] io::Error),

    /// Writing to stdout or stderr failed.
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),

    /// A pipeline thread could not be started.
    #[error("failed to start {0} thread")]
    Thread(String),
}

impl GargsError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GargsError::Config(_) => exit_codes::CONFIG_ERROR,
            GargsError::MissingInput => exit_codes::MISSING_INPUT,
            GargsError::Template(_)
            | GargsError::InputRead(_)
            | GargsError::Output(_)
            | GargsError::Thread(_) => exit_codes::FATAL,
        }
    }
}

/// Result type alias for gargs operations.
pub type Result<T> = std::result::Result<T, GargsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_has_correct_exit_code() {
        let err = GargsError::Config("bad flags".to_string());
        assert_eq!(err.exit_code(), exit_codes::CONFIG_ERROR);
    }

    #[test]
    fn missing_input_has_reserved_exit_code() {
        assert_eq!(GargsError::MissingInput.exit_code(), 255);
    }

    #[test]
    fn runtime_failures_are_fatal() {
        let err = GargsError::Template(TemplateError::IndexOutOfRange {
            index: 3,
            available: 1,
        });
        assert_eq!(err.exit_code(), exit_codes::FATAL);

        let err = GargsError::InputRead(io::Error::other("disk gone"));
        assert_eq!(err.exit_code(), exit_codes::FATAL);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = GargsError::InputRead(io::Error::other("disk gone"));
        assert_eq!(err.to_string(), "failed to read input: disk gone");

        let err = GargsError::Template(TemplateError::IndexOutOfRange {
            index: 1,
            available: 1,
        });
        assert_eq!(
            err.to_string(),
            "placeholder {1} is out of range: batch has 1 token(s)"
        );
    }
}
