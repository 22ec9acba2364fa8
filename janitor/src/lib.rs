//! Cloud janitor facade.
//!
//! Bundles the janitor crates behind feature flags. The primitives, calendar, and
//! rules are always available; the mark pass, configuration loading, and logging
//! setup can be disabled for embedders that bring their own.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use janitor_primitives as primitives;

/// Clocks and business-day calendars.
pub use janitor_calendar as calendar;

/// Cleanup rules, exclusions, and the rule engine.
pub use janitor_rules as rules;

/// Mark pass over crawled resources (enabled by `kernel` feature).
#[cfg(feature = "kernel")]
pub use janitor_kernel as kernel;

/// Configuration management (enabled by `config` feature).
#[cfg(feature = "config")]
pub use janitor_config as config;

/// Logging setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use janitor_telemetry as telemetry;
