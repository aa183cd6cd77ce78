//! Batch generator.
//!
//! Reads the input line by line, groups lines according to the batching
//! policy, renders each batch through the command template and hands the
//! result to the dispatcher. It runs on its own thread so reading input
//! overlaps with command execution; the rendezvous handoff to the engine
//! provides backpressure.
//!
//! Read and render failures are fatal to the whole run. They are reported on
//! a dedicated channel that the orchestrator watches alongside results.

mod batch;


pub use batch::{BatchPolicy, Batcher};

use crate::dispatch::Dispatcher;
use crate::error::{GargsError, Result};
use crate::template::{CommandTemplate, TemplateContext};
use crossbeam_channel::{Receiver, Sender, bounded};
use std::io::BufRead;
use std::thread;
use tracing::debug;

/// Turns an input stream into rendered commands.
pub struct Generator<R> {
    reader: R,
    batcher: Batcher,
    template: CommandTemplate,
}

impl<R: BufRead> Generator<R> {
    pub fn new(reader: R, policy: BatchPolicy, template: CommandTemplate) -> Self {
        Self {
            reader,
            batcher: Batcher::new(policy),
            template,
        }
    }

    /// Generate every command, passing each to `emit`.
    ///
    /// `emit` returns `Ok(false)` when downstream no longer accepts commands;
    /// generation then stops without error. Returns the number of commands
    /// rendered.
    pub fn run<F>(mut self, mut emit: F) -> Result<usize>
    where
        F: FnMut(String) -> Result<bool>,
    {
        let mut rendered = 0;
        let mut buf = Vec::new();

        while let Some(line) = read_line(&mut self.reader, &mut buf)? {
            if let Some(ctx) = self.batcher.push(line) {
                rendered += 1;
                if !emit(self.render(&ctx)?)? {
                    debug!(rendered, "command stream closed; stopping generation");
                    return Ok(rendered);
                }
            }
        }

        if let Some(ctx) = self.batcher.finish() {
            rendered += 1;
            emit(self.render(&ctx)?)?;
        }

        debug!(rendered, "input exhausted");
        Ok(rendered)
    }

    fn render(&self, ctx: &TemplateContext) -> Result<String> {
        Ok(self.template.render(ctx)?)
    }
}

/// Read one line, without its `\n` or trailing `\r`.
///
/// A final line without a newline still counts. Returns `None` at end of
/// input.
pub fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<Option<String>> {
    buf.clear();
    let read = reader
        .read_until(b'\n', buf)
        .map_err(GargsError::InputRead)?;
    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

/// Start the generator thread.
///
/// Commands the dispatcher forwards are sent on `commands`, which is dropped
/// once generation ends so the engine sees the end of the stream. The
/// returned receiver yields at most one fatal error.
pub fn spawn<R>(
    reader: R,
    policy: BatchPolicy,
    template: CommandTemplate,
    mut dispatcher: Dispatcher,
    commands: Sender<String>,
) -> Result<Receiver<GargsError>>
where
    R: BufRead + Send + 'static,
{
    let (fatal_tx, fatal_rx) = bounded(1);

    thread::Builder::new()
        .name("gargs-generator".to_string())
        .spawn(move || {
            let generator = Generator::new(reader, policy, template);
            let outcome = generator.run(|command| match dispatcher.dispatch(command)? {
                Some(command) => Ok(commands.send(command).is_ok()),
                None => Ok(true),
            });
            // Flush dry-run output even when generation failed, before the
            // fatal error lets the process exit.
            let flushed = dispatcher.finish();

            if let Err(err) = outcome.and(flushed) {
                debug!(error = %err, "command generation failed");
                let _ = fatal_tx.send(err);
            }
            // The fatal error must be queued before the engine sees the end
            // of the command stream.
            drop(commands);
        })
        .map_err(|_| GargsError::Thread("generator".to_string()))?;

    Ok(fatal_rx)
}
