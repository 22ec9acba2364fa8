//! Outcome of running the rule engine over one resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Describes what the engine decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// No rule objected; the resource is kept as-is.
    Valid,
    /// An exclusion shielded the resource before any rule ran.
    Excluded,
    /// At least one rule flagged the resource for cleanup.
    Flagged,
}

/// Structured result emitted by [`RuleEngine::evaluate`](crate::RuleEngine::evaluate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    decided_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    termination_time: Option<DateTime<Utc>>,
}

impl Evaluation {
    /// Returns a valid evaluation with no additional context.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            verdict: Verdict::Valid,
            decided_by: None,
            termination_time: None,
        }
    }

    /// Returns an evaluation naming the exclusion that applied.
    #[must_use]
    pub fn excluded(exclusion: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Excluded,
            decided_by: Some(exclusion.into()),
            termination_time: None,
        }
    }

    /// Returns an evaluation naming the rule whose schedule was applied.
    #[must_use]
    pub fn flagged(rule: impl Into<String>, termination_time: DateTime<Utc>) -> Self {
        Self {
            verdict: Verdict::Flagged,
            decided_by: Some(rule.into()),
            termination_time: Some(termination_time),
        }
    }

    /// Returns the verdict.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Returns true when the resource should be kept.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_flagged()
    }

    /// Returns true when the resource was flagged for cleanup.
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        self.verdict == Verdict::Flagged
    }

    /// Returns the rule or exclusion that decided the outcome.
    #[must_use]
    pub fn decided_by(&self) -> Option<&str> {
        self.decided_by.as_deref()
    }

    /// Returns the termination time written to the resource, if flagged.
    #[must_use]
    pub fn termination_time(&self) -> Option<DateTime<Utc>> {
        self.termination_time
    }
}
