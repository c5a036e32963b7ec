//! Process-wide `tracing` subscriber setup.
//!
//! The filter is read from `RUST_LOG`; when it is unset or invalid the
//! given default directive (e.g. `"info"`) is used instead.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber writing to stderr.
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
