//! Error types for the mark pass.

use thiserror::Error;
use tokio::task::JoinError;

use crate::scheduler::SchedulerError;

/// Errors that abort a mark pass.
#[derive(Debug, Error)]
pub enum JanitorError {
    /// The crawler could not list resources.
    #[error("crawler failure: {reason}")]
    Crawler {
        /// Human-readable explanation for logging and operators.
        reason: String,
    },
    /// The tracker could not read or record cleanup candidates.
    #[error("tracker failure: {reason}")]
    Tracker {
        /// Human-readable explanation for logging and operators.
        reason: String,
    },
    /// The scheduler refused to run an evaluation.
    #[error("scheduler error: {source}")]
    Scheduler {
        /// Source [`SchedulerError`].
        #[from]
        source: SchedulerError,
    },
    /// An evaluation task panicked or was cancelled.
    #[error("evaluation task failed: {source}")]
    Task {
        /// Source [`tokio::task::JoinError`].
        #[from]
        source: JoinError,
    },
}

impl JanitorError {
    /// Helper to construct crawler errors from string-like values.
    #[must_use]
    pub fn crawler(reason: impl Into<String>) -> Self {
        Self::Crawler {
            reason: reason.into(),
        }
    }

    /// Helper to construct tracker errors from string-like values.
    #[must_use]
    pub fn tracker(reason: impl Into<String>) -> Self {
        Self::Tracker {
            reason: reason.into(),
        }
    }
}

/// Result type alias for mark pass operations.
pub type JanitorResult<T> = Result<T, JanitorError>;
