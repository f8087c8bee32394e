//! `tracing-subscriber` setup.
//!
//! The library only emits `tracing` events; hosts that already install a
//! subscriber need nothing from here.  Logs go to stderr because stdout is
//! commonly the bridge's own outbound stream.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber filtered by `RUST_LOG`.
///
/// Falls back to `default_filter` (e.g. `"info"` or `"msgbridge=debug"`) when
/// `RUST_LOG` is absent or invalid.
///
/// # Errors
///
/// Returns an error if `default_filter` does not parse, or if a global
/// subscriber is already installed.
pub fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
