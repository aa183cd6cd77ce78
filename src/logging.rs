//! Diagnostic logging setup.
//!
//! Logs go to stderr so they never mix with command output on stdout. The
//! filter is read from `GARGS_LOG` using `tracing_subscriber::EnvFilter`
//! syntax (for example `GARGS_LOG=debug`) and defaults to warnings only.

use std::io::IsTerminal;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "GARGS_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the global tracing subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let ansi = std::io::stderr().is_terminal();

    // Ignore a second initialization instead of panicking.
    let _ = subscriber(filter, std::io::stderr, ansi).try_init();
}

/// Build the formatting subscriber. Colors only when `ansi` is set.
fn subscriber<W>(filter: EnvFilter, writer: W, ansi: bool) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .finish()
}
