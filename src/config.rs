//! Validated run configuration.
//!
//! `RunConfig` is built once from the parsed CLI before any input is read.
//! Every configuration problem (conflicting flags, zero counts, a bad
//! separator or shell, an uncompilable pattern) surfaces here.

use crate::cli::Cli;
use crate::error::{GargsError, Result};
use crate::generator::BatchPolicy;
use crate::template::CommandTemplate;
use regex::Regex;
use std::num::NonZeroUsize;

/// Everything a run needs, already checked for consistency.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// The compiled command pattern.
    pub template: CommandTemplate,
    /// How input lines are grouped into commands.
    pub policy: BatchPolicy,
    /// Number of concurrent workers.
    pub procs: NonZeroUsize,
    /// Shell argv; each command runs as `<shell...> -c <command>`.
    pub shell: Vec<String>,
    pub verbose: bool,
    pub continue_on_error: bool,
    pub ordered: bool,
    pub dry_run: bool,
}

impl RunConfig {
    /// Validate parsed arguments into a run configuration.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let sep = cli.sep.as_deref().filter(|s| !s.is_empty());

        if sep.is_some() && cli.nlines > 1 {
            return Err(GargsError::Config(
                "must specify either sep (-s) or n-lines (-n), not both".to_string(),
            ));
        }

        let procs = NonZeroUsize::new(cli.procs).ok_or_else(|| {
            GargsError::Config("number of processes (-p) must be at least 1".to_string())
        })?;

        let policy = match sep {
            Some(pattern) => {
                let regex = Regex::new(pattern).map_err(|e| {
                    GargsError::Config(format!("invalid separator regex '{}': {}", pattern, e))
                })?;
                BatchPolicy::Separator(regex)
            }
            None => {
                let nlines = NonZeroUsize::new(cli.nlines).ok_or_else(|| {
                    GargsError::Config("number of lines (-n) must be at least 1".to_string())
                })?;
                BatchPolicy::Count(nlines)
            }
        };

        let shell = parse_shell(&cli.shell)?;
        let template = CommandTemplate::compile(&cli.command)?;

        Ok(Self {
            template,
            policy,
            procs,
            shell,
            verbose: cli.verbose,
            continue_on_error: cli.continue_on_error,
            ordered: cli.ordered,
            dry_run: cli.dry_run,
        })
    }
}

fn parse_shell(shell: &str) -> Result<Vec<String>> {
    let argv = shell_words::split(shell).map_err(|e| {
        GargsError::Config(format!(
            "failed to parse shell '{}': {}\n\
             Fix: check for unmatched quotes or invalid escape sequences.",
            shell, e
        ))
    })?;

    if argv.is_empty() {
        return Err(GargsError::Config("shell must not be empty".to_string()));
    }
    Ok(argv)
}
