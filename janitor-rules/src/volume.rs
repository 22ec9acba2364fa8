//! Rules that apply to block storage volumes.

use std::sync::Arc;

use chrono::TimeDelta;
use janitor_calendar::BusinessCalendar;
use janitor_primitives::{Resource, ResourceType};
use tracing::{debug, info};

use crate::rule::{Rule, RuleResult, day_count, ensure_well_formed, termination_after};

/// Provider state of a volume that is not attached to any instance.
const AVAILABLE: &str = "available";

/// Flags volumes that have sat detached for at least `detached_days` days.
///
/// Age is measured from the volume's launch time; volumes the crawler could not
/// date are left alone.
#[derive(Debug, Clone)]
pub struct OldDetachedVolumeRule {
    calendar: Arc<dyn BusinessCalendar>,
    detached_days: u32,
    retention_days: u32,
}

impl OldDetachedVolumeRule {
    /// Creates the rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidConfiguration`](crate::RuleError::InvalidConfiguration)
    /// when either day count is outside `0..=MAX_DAY_COUNT`.
    pub fn new(
        calendar: Arc<dyn BusinessCalendar>,
        detached_days: i64,
        retention_days: i64,
    ) -> RuleResult<Self> {
        Ok(Self {
            calendar,
            detached_days: day_count("detached_days", detached_days)?,
            retention_days: day_count("retention_days", retention_days)?,
        })
    }

    fn reason(&self) -> String {
        format!(
            "Volume has been detached for at least {} days",
            self.detached_days
        )
    }
}

impl Rule for OldDetachedVolumeRule {
    fn name(&self) -> &str {
        "old-detached-volume"
    }

    fn is_valid(&self, resource: &mut Resource) -> RuleResult<bool> {
        ensure_well_formed(resource)?;
        if resource.resource_type() != &ResourceType::Volume || resource.state() != AVAILABLE {
            return Ok(true);
        }
        let Some(launch_time) = resource.launch_time() else {
            debug!(resource = %resource.id(), "detached volume has no launch time");
            return Ok(true);
        };

        let now = self.calendar.now();
        if now - launch_time < TimeDelta::days(i64::from(self.detached_days)) {
            return Ok(true);
        }

        let termination_time =
            termination_after(self.calendar.as_ref(), resource, self.retention_days)?;
        resource.schedule_termination(termination_time, self.reason());
        info!(resource = %resource.id(), %launch_time, "volume has been detached too long");
        Ok(false)
    }
}
