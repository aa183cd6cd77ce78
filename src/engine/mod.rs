//! Concurrent command execution.
//!
//! The orchestrator only depends on the `Executor` contract: take a stream of
//! command strings and a cancellation token, return a stream of results. The
//! engine must stop starting commands promptly once cancelled, let running
//! commands finish, and close the result stream when its workers are done.
//!
//! `ProcessPool` is the shipped implementation. It runs each command through
//! a shell on a fixed number of worker threads, and can re-sequence results
//! into input order.

mod cancel;
mod ordering;
mod pool;

pub use cancel::CancelToken;
pub use ordering::Resequencer;
pub use pool::ProcessPool;

use crate::error::Result;
use crossbeam_channel::{Receiver, Sender};
use std::io::Cursor;

/// Something that can run a stream of commands.
pub trait Executor {
    /// Start executing `commands`, returning the stream of their results.
    fn execute(&self, commands: Receiver<String>, cancel: CancelToken)
    -> Result<Receiver<ExecResult>>;
}

/// The outcome of one command.
#[derive(Debug)]
pub struct ExecResult {
    seq: usize,
    command: String,
    exit_code: i32,
    output: Vec<u8>,
    /// Dropped when the result is consumed, which releases the worker that
    /// produced it.
    release: Option<Sender<()>>,
}

impl ExecResult {
    pub fn new(seq: usize, command: String, exit_code: i32, output: Vec<u8>) -> Self {
        Self {
            seq,
            command,
            exit_code,
            output,
            release: None,
        }
    }

    pub(crate) fn with_release(mut self, release: Sender<()>) -> Self {
        self.release = Some(release);
        self
    }

    /// Position of the command in generation order.
    pub fn seq(&self) -> usize {
        self.seq
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Consume the result, yielding its captured stdout.
    pub fn into_reader(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.output)
    }
}
