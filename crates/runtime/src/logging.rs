//! Tracing subscriber setup for hosts and tests.

use tracing_subscriber::EnvFilter;

/// Installs a formatted subscriber filtered by `RUST_LOG`, or by
/// `default_filter` when the variable is unset.
///
/// Safe to call repeatedly: returns `false` if a global subscriber was
/// already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("tracing initialized");
    }
    installed
}
