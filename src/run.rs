//! Wiring a run together.
//!
//! The generator thread feeds the engine, and the orchestrator drains the
//! engine on the calling thread. `execute` is the CLI entry point;
//! `run_pipeline` takes its streams as arguments so it can run against
//! in-memory input and output.

use crate::cli::Cli;
use crate::config::RunConfig;
use crate::dispatch::Dispatcher;
use crate::engine::{CancelToken, Executor, ProcessPool};
use crate::error::{GargsError, Result};
use crate::exit_codes;
use crate::generator;
use crate::orchestrator::{Orchestrator, RunState};
use crossbeam_channel::bounded;
use std::io::{self, BufRead, BufReader, BufWriter, IsTerminal, Write};
use tracing::info;

/// Run gargs against the process's stdin and stdout.
///
/// Returns the highest exit status among the executed commands.
pub fn execute(cli: &Cli) -> Result<i32> {
    let config = RunConfig::from_cli(cli)?;

    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(GargsError::MissingInput);
    }

    let pool = ProcessPool::new(config.procs, config.shell.clone(), config.ordered);
    let dispatcher = Dispatcher::new(
        config.verbose,
        config.dry_run,
        Box::new(BufWriter::new(io::stdout())),
        Box::new(io::stderr()),
    );

    let state = run_pipeline(
        &config,
        BufReader::new(stdin),
        dispatcher,
        BufWriter::new(io::stdout()),
        &pool,
    )?;

    if config.dry_run {
        return Ok(exit_codes::SUCCESS);
    }
    Ok(state.exit_status())
}

/// Generate, execute and collect every command for one run.
pub fn run_pipeline<R, W, E>(
    config: &RunConfig,
    input: R,
    dispatcher: Dispatcher,
    out: W,
    executor: &E,
) -> Result<RunState>
where
    R: BufRead + Send + 'static,
    W: Write,
    E: Executor,
{
    info!(
        pattern = config.template.pattern(),
        procs = config.procs.get(),
        dry_run = config.dry_run,
        "starting run"
    );

    let cancel = CancelToken::new();
    let (command_tx, command_rx) = bounded(0);

    let results = executor.execute(command_rx, cancel.clone())?;
    let fatal = generator::spawn(
        input,
        config.policy.clone(),
        config.template.clone(),
        dispatcher,
        command_tx,
    )?;

    Orchestrator::new(out, config.continue_on_error, cancel).run(results, fatal)
}
