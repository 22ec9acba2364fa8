//! Configuration loading from JSON and the environment.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::schema::JanitorConfig;

/// Environment variable overriding the retention period of every rule.
pub const RETENTION_DAYS_ENV: &str = "JANITOR_RETENTION_DAYS";

/// Environment variable overriding the evaluation concurrency.
pub const MAX_CONCURRENCY_ENV: &str = "JANITOR_MAX_CONCURRENCY";

impl JanitorConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error when the document is malformed, carries unknown fields, or
    /// fails [`JanitorConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("failed to parse janitor config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or its contents are invalid.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read janitor config {}", path.display()))?;
        let config = Self::from_json_str(&raw)
            .with_context(|| format!("invalid janitor config {}", path.display()))?;
        debug!(path = %path.display(), "loaded janitor config");
        Ok(config)
    }

    /// Applies overrides from [`RETENTION_DAYS_ENV`] and [`MAX_CONCURRENCY_ENV`].
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is set but cannot be parsed or yields an
    /// invalid configuration.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_with(|key| env::var(key).ok())
    }

    /// Applies overrides using `lookup` in place of the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a value cannot be parsed or yields an invalid
    /// configuration.
    pub fn apply_overrides_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(RETENTION_DAYS_ENV) {
            let days: i64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{RETENTION_DAYS_ENV} must be an integer, got `{raw}`"))?;
            self.rules.no_owner_instance.retention_days = days;
            self.rules.untagged_instance.retention_days = days;
            self.rules.old_detached_volume.retention_days = days;
            debug!(days, "retention overridden from environment");
        }
        if let Some(raw) = lookup(MAX_CONCURRENCY_ENV) {
            self.scheduler.max_concurrency = raw.trim().parse().with_context(|| {
                format!("{MAX_CONCURRENCY_ENV} must be a positive integer, got `{raw}`")
            })?;
            debug!(
                max_concurrency = self.scheduler.max_concurrency,
                "concurrency overridden from environment"
            );
        }
        self.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use janitor_primitives::ResourceType;

    use super::*;
    use crate::schema::ConfigError;

    #[test]
    fn parses_partial_documents_with_defaults() {
        let config = JanitorConfig::from_json_str(
            r#"{
                "calendar": { "holidays": ["2024-12-25"] },
                "resource_types": ["INSTANCE", "volume"],
                "rules": { "old_detached_volume": { "enabled": true } }
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.calendar.holidays,
            [NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()]
        );
        assert_eq!(
            config.resource_types,
            [ResourceType::Instance, ResourceType::Volume]
        );
        assert!(config.rules.old_detached_volume.enabled);
        assert_eq!(config.rules.old_detached_volume.detached_days, 30);
        assert!(config.rules.no_owner_instance.enabled);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = JanitorConfig::from_json_str(r#"{ "rules": { "no_owner": {} } }"#).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn surfaces_validation_errors() {
        let err = JanitorConfig::from_json_str(
            r#"{ "rules": { "no_owner_instance": { "retention_days": -1 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Invalid { field, .. }) if *field == "rules.no_owner_instance.retention_days"
        ));
    }

    #[test]
    fn overrides_replace_retention_and_concurrency() {
        let vars = HashMap::from([
            (RETENTION_DAYS_ENV, "10"),
            (MAX_CONCURRENCY_ENV, " 4 "),
        ]);
        let mut config = JanitorConfig::default();
        config
            .apply_overrides_with(|key| vars.get(key).map(|v| (*v).to_owned()))
            .unwrap();

        assert_eq!(config.rules.no_owner_instance.retention_days, 10);
        assert_eq!(config.rules.old_detached_volume.retention_days, 10);
        assert_eq!(config.scheduler.max_concurrency, 4);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let mut config = JanitorConfig::default();
        assert!(
            config
                .apply_overrides_with(|key| (key == RETENTION_DAYS_ENV).then(|| "-2".to_owned()))
                .is_err()
        );

        let mut config = JanitorConfig::default();
        assert!(
            config
                .apply_overrides_with(|key| (key == MAX_CONCURRENCY_ENV).then(|| "many".to_owned()))
                .is_err()
        );
    }

    #[test]
    fn loads_files_and_reports_missing_ones() {
        let mut path = std::env::temp_dir();
        path.push(format!("janitor-config-{}.json", std::process::id()));
        fs::write(&path, r#"{ "scheduler": { "max_concurrency": 2 } }"#).unwrap();

        let config = JanitorConfig::load_from_path(&path).unwrap();
        assert_eq!(config.scheduler.max_concurrency, 2);
        fs::remove_file(&path).unwrap();

        let err = JanitorConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("failed to read janitor config"));
    }
}
