//! Log filter setup for the binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! `main`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives
pub const LOG_ENV: &str = "ADMINCTL_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Filter from `ADMINCTL_LOG`, or `warn` when unset or invalid
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the stderr fmt subscriber. Safe to call more than once.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
