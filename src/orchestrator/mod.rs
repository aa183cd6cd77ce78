//! Execution orchestrator.
//!
//! Drains results from the engine, copies each command's output to the
//! output stream, and keeps track of the worst exit status. Unless
//! continue-on-error is set, the first failing command cancels the run: the
//! engine starts nothing new, while results of commands that were already
//! running are still drained and copied.
//!
//! A fatal error from the generator ends the run immediately.


use crate::engine::{CancelToken, ExecResult};
use crate::error::{GargsError, Result};
use crossbeam_channel::{Receiver, never, select};
use std::io::{self, Write};
use tracing::{debug, warn};

/// Aggregate state of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    max_exit: i32,
    completed: usize,
    failed: usize,
}

impl RunState {
    /// Fold one command's exit status into the state.
    pub fn observe(&mut self, exit_code: i32) {
        self.completed += 1;
        if exit_code != 0 {
            self.failed += 1;
        }
        self.max_exit = self.max_exit.max(exit_code);
    }

    /// Highest exit status seen so far, or 0.
    pub fn exit_status(&self) -> i32 {
        self.max_exit
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }
}

enum Event {
    Result(ExecResult),
    Fatal(GargsError),
    /// The generator exited without a fatal error.
    GeneratorDone,
    EngineDone,
}

/// Consumes execution results and drives cancellation.
pub struct Orchestrator<W: Write> {
    out: W,
    continue_on_error: bool,
    cancel: CancelToken,
    state: RunState,
}

impl<W: Write> Orchestrator<W> {
    pub fn new(out: W, continue_on_error: bool, cancel: CancelToken) -> Self {
        Self {
            out,
            continue_on_error,
            cancel,
            state: RunState::default(),
        }
    }

    /// Run until the engine closes its result stream or the generator fails.
    pub fn run(
        mut self,
        results: Receiver<ExecResult>,
        mut fatal: Receiver<GargsError>,
    ) -> Result<RunState> {
        loop {
            let event = select! {
                recv(results) -> msg => msg.map_or(Event::EngineDone, Event::Result),
                recv(fatal) -> msg => msg.map_or(Event::GeneratorDone, Event::Fatal),
            };

            match event {
                Event::Result(result) => self.handle(result)?,
                Event::Fatal(err) => return Err(self.abort(err)),
                Event::GeneratorDone => fatal = never(),
                Event::EngineDone => break,
            }
        }

        // A generator failure queued just before the command stream closed.
        if let Ok(err) = fatal.try_recv() {
            return Err(self.abort(err));
        }

        self.out.flush().map_err(GargsError::Output)?;
        debug!(
            completed = self.state.completed(),
            failed = self.state.failed(),
            exit_status = self.state.exit_status(),
            "all results drained"
        );
        Ok(self.state)
    }

    fn handle(&mut self, result: ExecResult) -> Result<()> {
        let exit_code = result.exit_code();
        self.state.observe(exit_code);

        if exit_code != 0 {
            if self.continue_on_error {
                warn!(command = result.command(), exit_code, "command failed; continuing");
            } else if self.cancel.cancel() {
                warn!(
                    command = result.command(),
                    exit_code, "command failed; not starting any more commands"
                );
            }
        }

        io::copy(&mut result.into_reader(), &mut self.out).map_err(GargsError::Output)?;
        self.out.flush().map_err(GargsError::Output)
    }

    fn abort(&mut self, err: GargsError) -> GargsError {
        self.cancel.cancel();
        let _ = self.out.flush();
        err
    }
}
