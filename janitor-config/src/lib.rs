//! Configuration management for the janitor.
//!
//! [`JanitorConfig`] is deserialised from JSON, optionally adjusted from the
//! environment, validated, and finally turned into a calendar, scheduler, and
//! [`RuleEngine`](janitor_rules::RuleEngine).

#![warn(missing_docs, clippy::pedantic)]

mod factory;
mod loader;
mod schema;

pub use factory::{build_calendar, build_engine, build_scheduler};
pub use loader::{MAX_CONCURRENCY_ENV, RETENTION_DAYS_ENV};
pub use schema::{
    CalendarConfig, ConfigError, ExclusionConfig, JanitorConfig, NoOwnerInstanceConfig,
    OldDetachedVolumeConfig, RulesConfig, SchedulerSettings, TagValue, UntaggedInstanceConfig,
};
