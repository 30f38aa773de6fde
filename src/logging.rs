//! Diagnostic logging setup.
//!
//! Library code only emits `tracing` events; the binary installs a
//! subscriber that writes them to stderr so command output on stdout stays
//! machine-readable. Diagnostics are off unless `TASKDB_LOG` asks for them,
//! leaving stderr to the one-line error reports.

use tracing_subscriber::EnvFilter;

/// Environment variable holding `EnvFilter` directives.
pub const LOG_FILTER_VAR: &str = "TASKDB_LOG";

/// Filter applied when [`LOG_FILTER_VAR`] is unset or invalid.
pub const DEFAULT_FILTER: &str = "off";

/// Builds the event filter from optional directives.
///
/// Falls back to [`DEFAULT_FILTER`] when `directives` is `None` or does not
/// parse.
#[must_use]
pub fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global stderr subscriber, filtered by [`LOG_FILTER_VAR`].
///
/// # Errors
///
/// Returns an error when a global subscriber is already installed.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let directives = std::env::var(LOG_FILTER_VAR).ok();
    tracing_subscriber::fmt()
        .with_env_filter(filter_from(directives.as_deref()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init()
}
