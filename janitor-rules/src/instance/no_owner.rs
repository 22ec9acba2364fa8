//! Instances without an owner.

use std::sync::Arc;

use janitor_calendar::BusinessCalendar;
use janitor_primitives::Resource;
use tracing::info;

use super::RUNNING;
use crate::rule::{
    Rule, RuleError, RuleResult, day_count, ensure_well_formed, termination_after,
};

/// Tag holding the owner's contact address.
pub const DEFAULT_OWNER_TAG: &str = "owner";

/// Reason written onto instances flagged by [`NoOwnerInstanceRule`].
pub const NO_OWNER_REASON: &str = "No ownerEmail tag associated with this instance";

/// Flags running instances whose owner tag is missing or empty.
///
/// Flagged instances are scheduled for termination `retention_days` business
/// days after the moment of evaluation. Instances in any other state, including
/// `pending`, are left alone until they are running.
#[derive(Debug, Clone)]
pub struct NoOwnerInstanceRule {
    calendar: Arc<dyn BusinessCalendar>,
    retention_days: u32,
    owner_tag: String,
}

impl NoOwnerInstanceRule {
    /// Starts building a rule.
    #[must_use]
    pub fn builder() -> NoOwnerInstanceRuleBuilder {
        NoOwnerInstanceRuleBuilder {
            calendar: None,
            retention_days: 0,
            owner_tag: DEFAULT_OWNER_TAG.to_owned(),
        }
    }

    /// Creates a rule using the default owner tag.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidConfiguration`] when `retention_days` is negative
    /// or larger than [`MAX_DAY_COUNT`](crate::MAX_DAY_COUNT).
    pub fn new(calendar: Arc<dyn BusinessCalendar>, retention_days: i64) -> RuleResult<Self> {
        Self::builder()
            .calendar(calendar)
            .retention_days(retention_days)
            .build()
    }

    /// Returns the number of business days a flagged instance is retained.
    #[must_use]
    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Returns the tag inspected for an owner.
    #[must_use]
    pub fn owner_tag(&self) -> &str {
        &self.owner_tag
    }
}

impl Rule for NoOwnerInstanceRule {
    fn name(&self) -> &str {
        "no-owner-instance"
    }

    fn is_valid(&self, resource: &mut Resource) -> RuleResult<bool> {
        ensure_well_formed(resource)?;
        if !resource.resource_type().is_instance() {
            return Ok(true);
        }
        if resource.state() != RUNNING {
            return Ok(true);
        }
        if resource.non_empty_tag(&self.owner_tag).is_some() {
            return Ok(true);
        }

        let termination_time =
            termination_after(self.calendar.as_ref(), resource, self.retention_days)?;
        resource.schedule_termination(termination_time, NO_OWNER_REASON);
        info!(resource = %resource.id(), tag = %self.owner_tag, "instance has no owner tag");
        Ok(false)
    }
}

/// Builder for [`NoOwnerInstanceRule`].
#[derive(Debug)]
pub struct NoOwnerInstanceRuleBuilder {
    calendar: Option<Arc<dyn BusinessCalendar>>,
    retention_days: i64,
    owner_tag: String,
}

impl NoOwnerInstanceRuleBuilder {
    /// Sets the calendar used to compute termination times.
    #[must_use]
    pub fn calendar(mut self, calendar: Arc<dyn BusinessCalendar>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// Sets the number of business days an instance is retained before termination.
    #[must_use]
    pub fn retention_days(mut self, retention_days: i64) -> Self {
        self.retention_days = retention_days;
        self
    }

    /// Overrides the tag inspected for an owner.
    #[must_use]
    pub fn owner_tag(mut self, owner_tag: impl Into<String>) -> Self {
        self.owner_tag = owner_tag.into();
        self
    }

    /// Consumes the builder and returns the rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidConfiguration`] when no calendar was supplied,
    /// `retention_days` is outside `0..=MAX_DAY_COUNT`, or the owner tag is blank.
    pub fn build(self) -> RuleResult<NoOwnerInstanceRule> {
        let calendar = self.calendar.ok_or_else(|| {
            RuleError::InvalidConfiguration("no-owner rule requires a calendar".into())
        })?;
        let retention_days = day_count("retention_days", self.retention_days)?;
        if self.owner_tag.trim().is_empty() {
            return Err(RuleError::InvalidConfiguration(
                "owner tag cannot be empty".into(),
            ));
        }

        Ok(NoOwnerInstanceRule {
            calendar,
            retention_days,
            owner_tag: self.owner_tag,
        })
    }
}
