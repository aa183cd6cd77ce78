//! CLI argument parsing for gargs.
//!
//! Uses clap derive macros for declarative argument definitions. Values are
//! only parsed here; cross-flag validation happens when they are turned into
//! a `RunConfig`.

use clap::Parser;

/// Gargs: run a command for every line (or batch of lines) read from stdin.
///
/// `{}` in the command is replaced by the current line. `{N}` is replaced by
/// the Nth line of a batch (`-n`) or the Nth field of a split line (`-s`).
#[derive(Parser, Debug)]
#[command(name = "gargs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Command to execute for each line or batch.
    pub command: String,

    /// Number of processes to use.
    #[arg(short = 'p', long, default_value_t = 1)]
    pub procs: usize,

    /// Number of lines to consume for each command. -s and -n are mutually exclusive.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub nlines: usize,

    /// Regular expression to split each line with, filling the {N} spots.
    /// -s and -n are mutually exclusive.
    #[arg(short = 's', long)]
    pub sep: Option<String>,

    /// Print commands to stderr before they are executed.
    #[arg(short, long)]
    pub verbose: bool,

    /// Report errors but don't stop the entire execution.
    #[arg(short = 'c', long)]
    pub continue_on_error: bool,

    /// Keep output in order of input at the cost of reduced parallelism.
    #[arg(short, long)]
    pub ordered: bool,

    /// Print (but do not run) the commands.
    #[arg(short, long)]
    pub dry_run: bool,

    /// Shell used to run each command as `<shell> -c <command>`.
    #[arg(long, env = "SHELL", default_value = "sh")]
    pub shell: String,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
