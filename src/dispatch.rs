//! Command dispatcher.
//!
//! Sits between the generator and the execution engine. Verbose mode echoes
//! every command to stderr; dry-run mode prints commands to stdout and keeps
//! them away from the engine entirely.

use crate::error::{GargsError, Result};
use std::io::Write;

/// Applies verbose and dry-run side effects to generated commands.
pub struct Dispatcher {
    verbose: bool,
    dry_run: bool,
    stdout: Box<dyn Write + Send>,
    stderr: Box<dyn Write + Send>,
}

impl Dispatcher {
    pub fn new(
        verbose: bool,
        dry_run: bool,
        stdout: Box<dyn Write + Send>,
        stderr: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            verbose,
            dry_run,
            stdout,
            stderr,
        }
    }

    /// Handle one generated command.
    ///
    /// Returns the command when it should be executed, or `None` in dry-run
    /// mode.
    pub fn dispatch(&mut self, command: String) -> Result<Option<String>> {
        if self.verbose {
            writeln!(self.stderr, "command: {}", command).map_err(GargsError::Output)?;
            self.stderr.flush().map_err(GargsError::Output)?;
        }

        if self.dry_run {
            writeln!(self.stdout, "{}", command).map_err(GargsError::Output)?;
            return Ok(None);
        }

        Ok(Some(command))
    }

    /// Flush anything buffered for stdout or stderr.
    pub fn finish(&mut self) -> Result<()> {
        self.stdout.flush().map_err(GargsError::Output)?;
        self.stderr.flush().map_err(GargsError::Output)
    }
}
