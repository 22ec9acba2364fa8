//! Exclusions shield resources from every rule.

use std::fmt::Debug;

use janitor_primitives::Resource;

use crate::rule::{RuleError, RuleResult};

/// Predicate that keeps a resource out of cleanup regardless of the rules.
pub trait Exclusion: Send + Sync + Debug {
    /// Short identifier used in logs and evaluation results.
    fn name(&self) -> &str;

    /// Returns `true` when the resource must not be flagged.
    fn excludes(&self, resource: &Resource) -> bool;
}

/// Excludes resources whose owners opted out of cleanup.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptOutExclusion;

impl Exclusion for OptOutExclusion {
    fn name(&self) -> &str {
        "opt-out"
    }

    fn excludes(&self, resource: &Resource) -> bool {
        resource.opted_out()
    }
}

/// Excludes resources carrying a specific tag value.
#[derive(Debug, Clone)]
pub struct TagValueExclusion {
    name: String,
    key: String,
    value: String,
}

impl TagValueExclusion {
    /// Creates an exclusion matching `key=value`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidConfiguration`] when the key is blank.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> RuleResult<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(RuleError::InvalidConfiguration(
                "exclusion tag key cannot be empty".into(),
            ));
        }
        let value = value.into();
        Ok(Self {
            name: format!("tag:{key}={value}"),
            key,
            value,
        })
    }
}

impl Exclusion for TagValueExclusion {
    fn name(&self) -> &str {
        &self.name
    }

    fn excludes(&self, resource: &Resource) -> bool {
        resource.tag(&self.key) == Some(self.value.as_str())
    }
}
