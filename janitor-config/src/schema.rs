//! Strongly typed configuration schema.

use chrono::NaiveDate;
use janitor_primitives::ResourceType;
use janitor_rules::MAX_DAY_COUNT;
use janitor_rules::instance::DEFAULT_OWNER_TAG;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minutes in a day; offsets must stay strictly inside ±1 day.
const MINUTES_PER_DAY: i32 = 24 * 60;

/// Errors raised when a configuration fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A field holds a value the janitor cannot use.
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human-readable reason for rejection.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Top-level janitor configuration. Every section has defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JanitorConfig {
    /// Business-day calendar settings.
    pub calendar: CalendarConfig,
    /// Evaluation concurrency.
    pub scheduler: SchedulerSettings,
    /// Resource kinds crawled by each mark pass.
    pub resource_types: Vec<ResourceType>,
    /// Rule settings.
    pub rules: RulesConfig,
    /// Exclusion settings.
    pub exclusions: ExclusionConfig,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            calendar: CalendarConfig::default(),
            scheduler: SchedulerSettings::default(),
            resource_types: vec![ResourceType::Instance],
            rules: RulesConfig::default(),
            exclusions: ExclusionConfig::default(),
        }
    }
}

impl JanitorConfig {
    /// Checks every value before any rule is built.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.calendar.utc_offset_minutes.abs() >= MINUTES_PER_DAY {
            return Err(ConfigError::invalid(
                "calendar.utc_offset_minutes",
                format!("must be within ±{MINUTES_PER_DAY} minutes"),
            ));
        }
        if self.scheduler.max_concurrency == 0 {
            return Err(ConfigError::invalid(
                "scheduler.max_concurrency",
                "must be at least 1",
            ));
        }
        if self.resource_types.is_empty() {
            return Err(ConfigError::invalid(
                "resource_types",
                "at least one resource type is required",
            ));
        }

        let no_owner = &self.rules.no_owner_instance;
        day_count("rules.no_owner_instance.retention_days", no_owner.retention_days)?;
        if no_owner.owner_tag.trim().is_empty() {
            return Err(ConfigError::invalid(
                "rules.no_owner_instance.owner_tag",
                "cannot be empty",
            ));
        }

        let untagged = &self.rules.untagged_instance;
        day_count("rules.untagged_instance.retention_days", untagged.retention_days)?;
        if untagged.enabled && untagged.required_tags.iter().all(|t| t.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "rules.untagged_instance.required_tags",
                "at least one tag key is required when the rule is enabled",
            ));
        }

        let detached = &self.rules.old_detached_volume;
        day_count("rules.old_detached_volume.detached_days", detached.detached_days)?;
        day_count("rules.old_detached_volume.retention_days", detached.retention_days)?;

        if self
            .exclusions
            .tag_values
            .iter()
            .any(|tag| tag.key.trim().is_empty())
        {
            return Err(ConfigError::invalid(
                "exclusions.tag_values",
                "tag keys cannot be empty",
            ));
        }
        Ok(())
    }
}

fn day_count(field: &'static str, days: i64) -> Result<(), ConfigError> {
    if !(0..=i64::from(MAX_DAY_COUNT)).contains(&days) {
        return Err(ConfigError::invalid(
            field,
            format!("must be between 0 and {MAX_DAY_COUNT}, got {days}"),
        ));
    }
    Ok(())
}

/// Business-day calendar settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    /// Offset from UTC, in minutes, of the time zone that decides weekends.
    pub utc_offset_minutes: i32,
    /// Dates skipped like weekends, as `YYYY-MM-DD`.
    pub holidays: Vec<NaiveDate>,
}

/// Evaluation concurrency settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerSettings {
    /// Maximum number of resources evaluated at once.
    pub max_concurrency: usize,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 16,
        }
    }
}

/// Per-rule settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    /// Running instances without an owner tag.
    pub no_owner_instance: NoOwnerInstanceConfig,
    /// Running instances missing required tags.
    pub untagged_instance: UntaggedInstanceConfig,
    /// Volumes left detached for too long.
    pub old_detached_volume: OldDetachedVolumeConfig,
}

/// Settings for the no-owner instance rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoOwnerInstanceConfig {
    /// Whether the rule runs.
    pub enabled: bool,
    /// Business days between flagging and termination.
    pub retention_days: i64,
    /// Tag inspected for an owner.
    pub owner_tag: String,
}

impl Default for NoOwnerInstanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retention_days: 3,
            owner_tag: DEFAULT_OWNER_TAG.to_owned(),
        }
    }
}

/// Settings for the untagged instance rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UntaggedInstanceConfig {
    /// Whether the rule runs.
    pub enabled: bool,
    /// Business days between flagging and termination.
    pub retention_days: i64,
    /// Tag keys every running instance must carry.
    pub required_tags: Vec<String>,
}

impl Default for UntaggedInstanceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            retention_days: 3,
            required_tags: Vec::new(),
        }
    }
}

/// Settings for the old detached volume rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OldDetachedVolumeConfig {
    /// Whether the rule runs.
    pub enabled: bool,
    /// Calendar days a volume may stay detached.
    pub detached_days: i64,
    /// Business days between flagging and termination.
    pub retention_days: i64,
}

impl Default for OldDetachedVolumeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            detached_days: 30,
            retention_days: 7,
        }
    }
}

/// Exclusion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExclusionConfig {
    /// Honour the per-resource opt-out flag.
    pub opt_out: bool,
    /// Tag key/value pairs that shield a resource.
    pub tag_values: Vec<TagValue>,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            opt_out: true,
            tag_values: Vec::new(),
        }
    }
}

/// A tag key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagValue {
    /// Tag key.
    pub key: String,
    /// Exact tag value.
    pub value: String,
}
