//! Tracing setup for programs embedding the matcher.
//!
//! The library only emits events; nothing is printed until a subscriber is
//! installed.

use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info";

/// Install a stdout subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Calling it again, or after another subscriber was installed, does nothing.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt().with_env_filter(filter).try_init();
}
