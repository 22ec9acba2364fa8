//! Instances missing required tags.

use std::collections::BTreeSet;
use std::sync::Arc;

use janitor_calendar::BusinessCalendar;
use janitor_primitives::Resource;
use tracing::info;

use super::RUNNING;
use crate::rule::{
    Rule, RuleError, RuleResult, day_count, ensure_well_formed, termination_after,
};

/// Flags running instances that lack a non-empty value for any required tag.
#[derive(Debug, Clone)]
pub struct UntaggedInstanceRule {
    calendar: Arc<dyn BusinessCalendar>,
    required_tags: BTreeSet<String>,
    retention_days: u32,
}

impl UntaggedInstanceRule {
    /// Creates a rule requiring every key in `required_tags`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidConfiguration`] when `retention_days` is outside
    /// `0..=MAX_DAY_COUNT` or no non-blank tag keys are supplied.
    pub fn new<I, S>(
        calendar: Arc<dyn BusinessCalendar>,
        required_tags: I,
        retention_days: i64,
    ) -> RuleResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let retention_days = day_count("retention_days", retention_days)?;
        let required_tags: BTreeSet<String> = required_tags
            .into_iter()
            .map(Into::into)
            .filter(|tag: &String| !tag.trim().is_empty())
            .collect();
        if required_tags.is_empty() {
            return Err(RuleError::InvalidConfiguration(
                "untagged rule requires at least one tag key".into(),
            ));
        }

        Ok(Self {
            calendar,
            required_tags,
            retention_days,
        })
    }

    /// Returns the required tag keys.
    #[must_use]
    pub fn required_tags(&self) -> &BTreeSet<String> {
        &self.required_tags
    }
}

impl Rule for UntaggedInstanceRule {
    fn name(&self) -> &str {
        "untagged-instance"
    }

    fn is_valid(&self, resource: &mut Resource) -> RuleResult<bool> {
        ensure_well_formed(resource)?;
        if !resource.resource_type().is_instance() || resource.state() != RUNNING {
            return Ok(true);
        }

        let missing: Vec<&str> = self
            .required_tags
            .iter()
            .map(String::as_str)
            .filter(|key| resource.non_empty_tag(key).is_none())
            .collect();
        if missing.is_empty() {
            return Ok(true);
        }

        let reason = format!("Instance is missing required tags: {}", missing.join(", "));
        let termination_time =
            termination_after(self.calendar.as_ref(), resource, self.retention_days)?;
        info!(resource = %resource.id(), missing = ?missing, "instance is missing required tags");
        resource.schedule_termination(termination_time, reason);
        Ok(false)
    }
}
