//! Janitor mark pass.
//!
//! Crawls live resources, runs the shared [`RuleEngine`](janitor_rules::RuleEngine)
//! over each of them on a bounded [`TaskScheduler`], and reconciles the verdicts
//! with the cleanup candidates already tracked. Crawling and tracking are
//! supplied by the caller through [`ResourceCrawler`] and [`ResourceTracker`].

#![warn(missing_docs, clippy::pedantic)]

mod collaborators;
mod error;
mod janitor;
mod scheduler;

pub use collaborators::{ResourceCrawler, ResourceTracker};
pub use error::{JanitorError, JanitorResult};
pub use janitor::{Janitor, MarkReport};
pub use scheduler::{DEFAULT_MAX_CONCURRENCY, SchedulerError, SchedulerResult, TaskScheduler};
