//! Observability utilities for the janitor.
//!
//! Every crate logs through `tracing`; binaries embedding the janitor call
//! [`init_tracing`] once at startup to install a subscriber.

#![warn(missing_docs, clippy::pedantic)]

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Builds the filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a formatting subscriber filtered by `RUST_LOG`.
///
/// # Errors
///
/// Returns an error when a global subscriber has already been installed.
pub fn try_init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

/// Installs a formatting subscriber filtered by `RUST_LOG`, ignoring a subscriber
/// that is already present.
pub fn init_tracing() {
    if let Err(err) = try_init_tracing() {
        tracing::debug!(error = %err, "tracing already initialised");
    }
}
