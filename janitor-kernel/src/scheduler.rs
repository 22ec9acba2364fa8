//! Bounded task scheduler for rule evaluations.
//!
//! A mark pass may crawl thousands of resources. Every resource is evaluated in
//! its own task, and the scheduler caps how many of those tasks hold a permit
//! at once.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Concurrency used when none is configured.
pub const DEFAULT_MAX_CONCURRENCY: NonZeroUsize = NonZeroUsize::new(16).unwrap();

/// Caps how many resource evaluations run in parallel.
///
/// Clones share the same permits, so a scheduler handed to several janitors
/// bounds all of them together.
#[derive(Debug, Clone)]
pub struct TaskScheduler {
    permits: Arc<Semaphore>,
    max_concurrency: NonZeroUsize,
}

impl TaskScheduler {
    /// Creates a scheduler running at most `max_concurrency` evaluations.
    #[must_use]
    pub fn new(max_concurrency: NonZeroUsize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrency.get())),
            max_concurrency,
        }
    }

    /// Returns the concurrency limit.
    #[must_use]
    pub const fn max_concurrency(&self) -> NonZeroUsize {
        self.max_concurrency
    }

    /// Returns how many evaluations could start right now.
    #[must_use]
    pub fn idle_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Stops accepting evaluations.
    ///
    /// Evaluations already running finish normally. Queued ones resolve to
    /// [`SchedulerError::Closed`] without running.
    pub fn close(&self) {
        self.permits.close();
    }

    /// Queues `evaluation` until a permit is free, then runs it.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Closed`] when the scheduler is already closed.
    /// The returned handle yields the same error if the scheduler closes while
    /// the evaluation is still queued.
    pub fn spawn<F, T>(&self, evaluation: F) -> SchedulerResult<JoinHandle<SchedulerResult<T>>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if self.is_closed() {
            return Err(SchedulerError::Closed);
        }

        let permits = Arc::clone(&self.permits);
        Ok(tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| SchedulerError::Closed)?;
            Ok(evaluation.await)
        }))
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENCY)
    }
}

/// Errors produced by the scheduler.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// The scheduler was closed before the evaluation started.
    #[error("scheduler closed")]
    Closed,
}

/// Result alias for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;
