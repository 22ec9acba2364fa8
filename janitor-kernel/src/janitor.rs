//! One mark pass over the crawled resources.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use janitor_calendar::BusinessCalendar;
use janitor_primitives::{Resource, ResourceType};
use janitor_rules::RuleEngine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::collaborators::{ResourceCrawler, ResourceTracker};
use crate::error::JanitorResult;
use crate::scheduler::TaskScheduler;

/// Summary of a mark pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkReport {
    /// Resources evaluated.
    pub checked: usize,
    /// Identifiers of resources newly marked for cleanup.
    pub marked: Vec<String>,
    /// Identifiers of previously marked resources that are valid again.
    pub unmarked: Vec<String>,
    /// Resources whose evaluation failed and were skipped.
    pub failed: usize,
}

/// Runs rule evaluation over crawled resources and reconciles the result with
/// the tracker.
pub struct Janitor<C, T>
where
    C: ResourceCrawler + 'static,
    T: ResourceTracker + 'static,
{
    crawler: Arc<C>,
    tracker: Arc<T>,
    engine: Arc<RuleEngine>,
    calendar: Arc<dyn BusinessCalendar>,
    scheduler: TaskScheduler,
    resource_types: Vec<ResourceType>,
}

impl<C, T> Janitor<C, T>
where
    C: ResourceCrawler + 'static,
    T: ResourceTracker + 'static,
{
    /// Creates a janitor that handles instances with the default scheduler.
    #[must_use]
    pub fn new(
        crawler: Arc<C>,
        tracker: Arc<T>,
        engine: Arc<RuleEngine>,
        calendar: Arc<dyn BusinessCalendar>,
    ) -> Self {
        Self {
            crawler,
            tracker,
            engine,
            calendar,
            scheduler: TaskScheduler::default(),
            resource_types: vec![ResourceType::Instance],
        }
    }

    /// Replaces the scheduler used for evaluations.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: TaskScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Replaces the resource kinds crawled on each pass.
    #[must_use]
    pub fn with_resource_types<I>(mut self, resource_types: I) -> Self
    where
        I: IntoIterator<Item = ResourceType>,
    {
        self.resource_types = resource_types.into_iter().collect();
        self
    }

    /// Returns the resource kinds crawled on each pass.
    #[must_use]
    pub fn resource_types(&self) -> &[ResourceType] {
        &self.resource_types
    }

    /// Crawls every configured resource kind once and marks or unmarks
    /// resources according to the rule engine.
    ///
    /// Resources that are flagged and already tracked keep the schedule they were
    /// first marked with. A resource whose evaluation fails is logged and counted
    /// in [`MarkReport::failed`]; the rest of the pass continues.
    ///
    /// # Errors
    ///
    /// Returns [`JanitorError`](crate::JanitorError) when the crawler, tracker, or
    /// scheduler fails.
    pub async fn mark_resources(&self) -> JanitorResult<MarkReport> {
        let mut report = MarkReport::default();
        for resource_type in &self.resource_types {
            self.mark_resource_type(resource_type, &mut report).await?;
        }
        info!(
            checked = report.checked,
            marked = report.marked.len(),
            unmarked = report.unmarked.len(),
            failed = report.failed,
            "mark pass finished"
        );
        Ok(report)
    }

    async fn mark_resource_type(
        &self,
        resource_type: &ResourceType,
        report: &mut MarkReport,
    ) -> JanitorResult<()> {
        let crawled = self.crawler.resources(resource_type).await?;
        let mut tracked: HashMap<String, Resource> = self
            .tracker
            .marked(resource_type)
            .await?
            .into_iter()
            .map(|resource| (resource.id().to_owned(), resource))
            .collect();
        debug!(
            %resource_type,
            crawled = crawled.len(),
            tracked = tracked.len(),
            "evaluating resources"
        );

        // Each task owns its resource, so rules never race on termination fields.
        let mut handles = Vec::with_capacity(crawled.len());
        for mut resource in crawled {
            let engine = Arc::clone(&self.engine);
            handles.push(self.scheduler.spawn(async move {
                let evaluation = engine.evaluate(&mut resource);
                (resource, evaluation)
            })?);
        }

        let now = self.calendar.now();
        for joined in join_all(handles).await {
            let (mut resource, evaluation) = joined??;
            report.checked += 1;

            let evaluation = match evaluation {
                Ok(evaluation) => evaluation,
                Err(err) => {
                    warn!(resource = %resource.id(), error = %err, "skipping resource");
                    report.failed += 1;
                    continue;
                }
            };

            let previous = tracked.remove(resource.id());
            match (evaluation.is_flagged(), previous) {
                (true, None) => {
                    resource.set_mark_time(Some(now));
                    self.tracker.mark(&resource).await?;
                    info!(
                        resource = %resource.id(),
                        reason = resource.termination_reason().unwrap_or_default(),
                        "marked resource for cleanup"
                    );
                    report.marked.push(resource.id().to_owned());
                }
                (true, Some(_)) => {
                    debug!(resource = %resource.id(), "resource already marked");
                }
                (false, Some(_)) => {
                    resource.clear_termination();
                    resource.set_mark_time(None);
                    self.tracker.unmark(&resource).await?;
                    info!(resource = %resource.id(), "unmarked resource that is valid again");
                    report.unmarked.push(resource.id().to_owned());
                }
                (false, None) => {}
            }
        }
        Ok(())
    }
}
