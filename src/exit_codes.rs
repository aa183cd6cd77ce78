//! Exit code constants for the gargs CLI.
//!
//! When every command ran, gargs exits with the highest exit status seen
//! across them. The remaining codes are reserved for runs that never got that
//! far:
//! - 0: Success
//! - 1: Fatal runtime error (template, render, or input read failure)
//! - 2: Configuration error (conflicting or invalid flags)
//! - 255: No input connected to stdin

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Fatal runtime error: bad template, render failure, or unreadable input.
pub const FATAL: i32 = 1;

/// Configuration error: conflicting flags, zero counts, or a bad separator.
pub const CONFIG_ERROR: i32 = 2;

/// Stdin is a terminal, so there is nothing to read commands from.
pub const MISSING_INPUT: i32 = 255;

/// Clamp a command's exit status into the range a process can return.
pub fn clamp(status: i32) -> u8 {
    status.clamp(0, 255) as u8
}
