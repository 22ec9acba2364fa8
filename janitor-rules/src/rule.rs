//! The rule contract shared by every cleanup policy.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use janitor_calendar::BusinessCalendar;
use janitor_primitives::Resource;
use thiserror::Error;

/// Largest day count a rule accepts, roughly a century.
pub const MAX_DAY_COUNT: u32 = 36_500;

/// Errors surfaced by rules and the rule engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    /// Rule dependencies or parameters were malformed at construction time.
    #[error("invalid rule configuration: {0}")]
    InvalidConfiguration(String),
    /// The resource handed to a rule was not well formed.
    #[error("invalid rule argument: {0}")]
    InvalidArgument(String),
    /// A rule rejected a resource without writing a termination schedule.
    #[error("rule {rule} rejected {resource} without scheduling termination")]
    MissingSchedule {
        /// Name of the offending rule.
        rule: String,
        /// Identifier of the rejected resource.
        resource: String,
    },
}

/// Result alias for rule operations.
pub type RuleResult<T> = Result<T, RuleError>;

/// A single cleanup policy.
///
/// Rules are immutable once built and may be shared across threads. A rule
/// returns `Ok(true)` when it has no objection to the resource, including for
/// resource kinds it does not handle. When it returns `Ok(false)` it has already
/// written a termination schedule onto the resource.
pub trait Rule: Send + Sync + Debug {
    /// Short identifier used in logs and evaluation results.
    fn name(&self) -> &str;

    /// Evaluates the resource, scheduling its termination when it is not valid.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidArgument`] when the resource has no identifier.
    fn is_valid(&self, resource: &mut Resource) -> RuleResult<bool>;
}

/// Rejects resources that could not have come from a crawler.
pub(crate) fn ensure_well_formed(resource: &Resource) -> RuleResult<()> {
    if resource.id().trim().is_empty() {
        return Err(RuleError::InvalidArgument(
            "resource id cannot be empty".into(),
        ));
    }
    Ok(())
}

/// Converts a configured day count, rejecting values outside `0..=MAX_DAY_COUNT`.
pub(crate) fn day_count(field: &str, days: i64) -> RuleResult<u32> {
    u32::try_from(days)
        .ok()
        .filter(|days| *days <= MAX_DAY_COUNT)
        .ok_or_else(|| {
            RuleError::InvalidConfiguration(format!(
                "{field} must be between 0 and {MAX_DAY_COUNT}, got {days}"
            ))
        })
}

/// Computes the termination time `days` business days from now.
pub(crate) fn termination_after(
    calendar: &dyn BusinessCalendar,
    resource: &Resource,
    days: u32,
) -> RuleResult<DateTime<Utc>> {
    calendar
        .add_business_days(calendar.now(), days)
        .ok_or_else(|| {
            RuleError::InvalidArgument(format!(
                "termination time for {} is outside the calendar range",
                resource.id()
            ))
        })
}

#[cfg(test)]
mod tests {
    use janitor_primitives::ResourceType;

    use super::*;

    #[test]
    fn day_count_rejects_values_out_of_range() {
        assert_eq!(day_count("retention_days", 7), Ok(7));
        assert_eq!(day_count("retention_days", 0), Ok(0));
        assert_eq!(
            day_count("retention_days", i64::from(MAX_DAY_COUNT)),
            Ok(MAX_DAY_COUNT)
        );
        for days in [-1, i64::from(MAX_DAY_COUNT) + 1, i64::from(u32::MAX), i64::MAX] {
            assert!(matches!(
                day_count("retention_days", days),
                Err(RuleError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn blank_ids_are_invalid_arguments() {
        let resource: Resource =
            serde_json::from_str(r#"{"id":"","resource_type":"instance"}"#).unwrap();
        assert!(matches!(
            ensure_well_formed(&resource),
            Err(RuleError::InvalidArgument(_))
        ));

        let resource = Resource::builder("i-1", ResourceType::Instance).build().unwrap();
        assert!(ensure_well_formed(&resource).is_ok());
    }
}
