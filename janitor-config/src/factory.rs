//! Turns a validated configuration into runtime components.

use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::FixedOffset;
use janitor_calendar::{BusinessCalendar, Clock, WorkCalendar};
use janitor_kernel::TaskScheduler;
use janitor_rules::{
    NoOwnerInstanceRule, OldDetachedVolumeRule, OptOutExclusion, RuleEngine, RuleError,
    RuleResult, TagValueExclusion, UntaggedInstanceRule,
};
use tracing::info;

use crate::schema::{CalendarConfig, JanitorConfig, SchedulerSettings};

/// Builds the business-day calendar described by `config`.
///
/// # Errors
///
/// Returns [`RuleError::InvalidConfiguration`] when the UTC offset is out of range.
pub fn build_calendar(config: &CalendarConfig, clock: Arc<dyn Clock>) -> RuleResult<WorkCalendar> {
    let offset = config
        .utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            RuleError::InvalidConfiguration(format!(
                "utc offset of {} minutes is out of range",
                config.utc_offset_minutes
            ))
        })?;
    Ok(WorkCalendar::new(clock)
        .with_offset(offset)
        .with_holidays(config.holidays.iter().copied()))
}

/// Builds the evaluation scheduler.
///
/// # Errors
///
/// Returns [`RuleError::InvalidConfiguration`] when the concurrency is zero.
pub fn build_scheduler(settings: &SchedulerSettings) -> RuleResult<TaskScheduler> {
    let max_concurrency = NonZeroUsize::new(settings.max_concurrency).ok_or_else(|| {
        RuleError::InvalidConfiguration("max_concurrency must be at least 1".into())
    })?;
    Ok(TaskScheduler::new(max_concurrency))
}

/// Builds the rule engine for the enabled rules and exclusions.
///
/// Rules are added in a fixed order: no-owner instances, untagged instances,
/// old detached volumes.
///
/// # Errors
///
/// Returns [`RuleError::InvalidConfiguration`] when any rule or exclusion rejects
/// its settings.
pub fn build_engine(
    config: &JanitorConfig,
    calendar: &Arc<dyn BusinessCalendar>,
) -> RuleResult<RuleEngine> {
    let mut engine = RuleEngine::new();
    let rules = &config.rules;

    if rules.no_owner_instance.enabled {
        let rule = NoOwnerInstanceRule::builder()
            .calendar(Arc::clone(calendar))
            .retention_days(rules.no_owner_instance.retention_days)
            .owner_tag(rules.no_owner_instance.owner_tag.clone())
            .build()?;
        engine.add_rule(Arc::new(rule));
    }
    if rules.untagged_instance.enabled {
        engine.add_rule(Arc::new(UntaggedInstanceRule::new(
            Arc::clone(calendar),
            rules.untagged_instance.required_tags.iter().cloned(),
            rules.untagged_instance.retention_days,
        )?));
    }
    if rules.old_detached_volume.enabled {
        engine.add_rule(Arc::new(OldDetachedVolumeRule::new(
            Arc::clone(calendar),
            rules.old_detached_volume.detached_days,
            rules.old_detached_volume.retention_days,
        )?));
    }

    if config.exclusions.opt_out {
        engine.add_exclusion(Arc::new(OptOutExclusion));
    }
    for tag in &config.exclusions.tag_values {
        engine.add_exclusion(Arc::new(TagValueExclusion::new(&tag.key, &tag.value)?));
    }

    let rule_names: Vec<&str> = engine.rules().iter().map(|rule| rule.name()).collect();
    info!(
        rules = ?rule_names,
        exclusions = engine.exclusions().len(),
        "rule engine assembled"
    );
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use janitor_calendar::FixedClock;

    use super::*;
    use crate::schema::TagValue;

    fn calendar() -> Arc<dyn BusinessCalendar> {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Arc::new(WorkCalendar::new(Arc::new(FixedClock::new(now))))
    }

    #[test]
    fn default_config_enables_no_owner_rule_and_opt_out() {
        let engine = build_engine(&JanitorConfig::default(), &calendar()).unwrap();
        let names: Vec<&str> = engine.rules().iter().map(|rule| rule.name()).collect();
        assert_eq!(names, ["no-owner-instance"]);
        assert_eq!(engine.exclusions().len(), 1);
    }

    #[test]
    fn enables_rules_in_fixed_order() {
        let mut config = JanitorConfig::default();
        config.rules.untagged_instance.enabled = true;
        config.rules.untagged_instance.required_tags = vec!["app".into()];
        config.rules.old_detached_volume.enabled = true;
        config.exclusions.opt_out = false;
        config.exclusions.tag_values.push(TagValue {
            key: "janitor".into(),
            value: "skip".into(),
        });

        let engine = build_engine(&config, &calendar()).unwrap();
        let names: Vec<&str> = engine.rules().iter().map(|rule| rule.name()).collect();
        assert_eq!(
            names,
            ["no-owner-instance", "untagged-instance", "old-detached-volume"]
        );
        assert_eq!(engine.exclusions()[0].name(), "tag:janitor=skip");
    }

    #[test]
    fn rule_errors_surface_as_invalid_configuration() {
        let mut config = JanitorConfig::default();
        config.rules.no_owner_instance.retention_days = -1;
        assert!(matches!(
            build_engine(&config, &calendar()),
            Err(RuleError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn calendar_honours_offset_and_holidays() {
        let config = CalendarConfig {
            utc_offset_minutes: -480,
            holidays: vec![NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()],
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let calendar = build_calendar(&config, Arc::new(FixedClock::new(now))).unwrap();
        assert_eq!(calendar.offset(), FixedOffset::west_opt(8 * 3600).unwrap());
        assert!(!calendar.is_business_day(Utc.with_ymd_and_hms(2024, 1, 2, 20, 0, 0).unwrap()));

        let config = CalendarConfig {
            utc_offset_minutes: 24 * 60,
            holidays: Vec::new(),
        };
        assert!(build_calendar(&config, Arc::new(FixedClock::new(now))).is_err());
    }

    #[test]
    fn scheduler_requires_concurrency() {
        assert!(build_scheduler(&SchedulerSettings { max_concurrency: 0 }).is_err());
        let scheduler = build_scheduler(&SchedulerSettings { max_concurrency: 3 }).unwrap();
        assert_eq!(scheduler.max_concurrency().get(), 3);
    }
}
