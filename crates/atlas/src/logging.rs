//! Tracing subscriber setup for binaries built on Atlas.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a formatted subscriber filtered by `RUST_LOG`.
///
/// Returns `false` if a global subscriber was already installed, which
/// happens when tests or a host application set one up first.
pub fn init() -> bool {
    init_with(DEFAULT_FILTER)
}

/// Like [`init`], with an explicit fallback filter.
pub fn init_with(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
