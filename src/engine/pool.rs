//! Shell subprocess worker pool.
//!
//! Executes commands as `<shell...> -c <command>` with stdout captured and
//! stderr passed through.

use super::{CancelToken, ExecResult, Executor, Resequencer};
use crate::error::{GargsError, Result};
use crossbeam_channel::{Receiver, Sender, bounded, select};
use std::io::Read;
use std::num::NonZeroUsize;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Exit status reported when a command's shell could not be started.
pub const SPAWN_FAILURE: i32 = 127;

/// A command tagged with its position in generation order.
#[derive(Debug)]
struct Job {
    seq: usize,
    command: String,
}

/// Runs commands on a fixed number of worker threads.
#[derive(Debug, Clone)]
pub struct ProcessPool {
    workers: NonZeroUsize,
    shell: Arc<[String]>,
    ordered: bool,
}

impl ProcessPool {
    /// Create a pool.
    ///
    /// # Arguments
    ///
    /// * `workers` - Number of commands allowed to run at once
    /// * `shell` - Shell argv; `-c <command>` is appended per command
    /// * `ordered` - Deliver results in input order instead of completion order
    pub fn new(workers: NonZeroUsize, shell: Vec<String>, ordered: bool) -> Self {
        Self {
            workers,
            shell: shell.into(),
            ordered,
        }
    }
}

impl Executor for ProcessPool {
    fn execute(
        &self,
        commands: Receiver<String>,
        cancel: CancelToken,
    ) -> Result<Receiver<ExecResult>> {
        let (job_tx, job_rx) = bounded::<Job>(0);
        let (result_tx, result_rx) = bounded::<ExecResult>(0);

        let feeder_cancel = cancel.clone();
        spawn_named("feeder", move || feed(commands, job_tx, feeder_cancel))?;

        let delivered = if self.ordered {
            let (ordered_tx, ordered_rx) = bounded::<ExecResult>(0);
            spawn_named("resequencer", move || resequence(result_rx, ordered_tx))?;
            ordered_rx
        } else {
            result_rx
        };

        for id in 0..self.workers.get() {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            let cancel = cancel.clone();
            let shell = Arc::clone(&self.shell);
            spawn_named(&format!("worker-{}", id), move || {
                work(id, &shell, jobs, results, cancel)
            })?;
        }

        debug!(
            workers = self.workers.get(),
            ordered = self.ordered,
            "process pool started"
        );
        Ok(delivered)
    }
}

fn spawn_named<F>(name: &str, f: F) -> Result<()>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(format!("gargs-{}", name))
        .spawn(f)
        .map(|_| ())
        .map_err(|_| GargsError::Thread(name.to_string()))
}

/// Tag incoming commands with sequence numbers and hand them to workers.
///
/// Returning drops `commands`, which unblocks the generator once the pool
/// has been cancelled.
fn feed(commands: Receiver<String>, jobs: Sender<Job>, cancel: CancelToken) {
    let mut seq = 0;

    loop {
        let command = select! {
            recv(cancel.signal()) -> _ => break,
            recv(commands) -> msg => match msg {
                Ok(command) => command,
                Err(_) => break,
            },
        };
        if cancel.is_cancelled() {
            break;
        }

        select! {
            recv(cancel.signal()) -> _ => break,
            send(jobs, Job { seq, command }) -> res => {
                if res.is_err() {
                    break;
                }
            },
        }
        seq += 1;
    }

    debug!(accepted = seq, "feeder finished");
}

fn work(
    id: usize,
    shell: &[String],
    jobs: Receiver<Job>,
    results: Sender<ExecResult>,
    cancel: CancelToken,
) {
    loop {
        let job = select! {
            recv(cancel.signal()) -> _ => break,
            recv(jobs) -> msg => match msg {
                Ok(job) => job,
                Err(_) => break,
            },
        };
        if cancel.is_cancelled() {
            debug!(worker = id, seq = job.seq, "cancelled; not starting command");
            break;
        }

        let (release_tx, release_rx) = bounded::<()>(0);
        let result = run_command(shell, job.seq, job.command).with_release(release_tx);
        if results.send(result).is_err() {
            break;
        }

        // Hold off on the next job until this result has been consumed, so a
        // failure can cancel the run before another command starts.
        select! {
            recv(release_rx) -> _ => {},
            recv(cancel.signal()) -> _ => {},
        }
    }
}

fn resequence(results: Receiver<ExecResult>, ordered: Sender<ExecResult>) {
    let mut reseq = Resequencer::new();

    for result in results.iter() {
        for ready in reseq.push(result) {
            if ordered.send(ready).is_err() {
                return;
            }
        }
    }

    if reseq.pending() > 0 {
        warn!(
            pending = reseq.pending(),
            "releasing results out of sequence after cancellation"
        );
    }
    for result in reseq.drain() {
        if ordered.send(result).is_err() {
            return;
        }
    }
}

/// Run one command to completion and capture its stdout.
///
/// A shell that cannot be spawned yields `SPAWN_FAILURE` with no output
/// rather than an error, so it counts as a failed command.
pub fn run_command(shell: &[String], seq: usize, command: String) -> ExecResult {
    let Some((program, shell_args)) = shell.split_first() else {
        error!(seq, "no shell configured");
        return ExecResult::new(seq, command, SPAWN_FAILURE, Vec::new());
    };

    let start_time = Instant::now();
    let mut child = match Command::new(program)
        .args(shell_args)
        .arg("-c")
        .arg(&command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            error!(seq, shell = %program, error = %e, "failed to spawn command");
            return ExecResult::new(seq, command, SPAWN_FAILURE, Vec::new());
        }
    };

    let mut output = Vec::new();
    if let Some(mut stdout) = child.stdout.take()
        && let Err(e) = stdout.read_to_end(&mut output)
    {
        warn!(seq, error = %e, "failed to read command output");
    }

    let exit_code = match child.wait() {
        Ok(status) => status_code(status),
        Err(e) => {
            error!(seq, error = %e, "failed to wait for command");
            1
        }
    };

    debug!(
        seq,
        exit_code,
        bytes = output.len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "command finished"
    );
    ExecResult::new(seq, command, exit_code, output)
}

/// Convert an exit status to a code, mapping signal deaths to `128 + signal`.
fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
