//! Rule engine composing rules and exclusions.

use std::sync::Arc;

use janitor_primitives::{Resource, TerminationSchedule};
use tracing::{debug, info, warn};

use crate::decision::Evaluation;
use crate::exclusion::Exclusion;
use crate::rule::{Rule, RuleError, RuleResult, ensure_well_formed};

/// Applies an ordered rule set to one resource at a time.
///
/// A resource is flagged when any rule rejects it. When several rules reject it
/// the schedule terminating soonest is kept; ties go to the rule added first.
/// Each rule runs against a scratch copy so only the winning schedule is ever
/// written to the caller's resource.
///
/// The engine holds no mutable state and can be shared across tasks behind an
/// [`Arc`]. A single resource must not be evaluated concurrently.
#[derive(Debug, Default, Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn Rule>>,
    exclusions: Vec<Arc<dyn Exclusion>>,
}

impl RuleEngine {
    /// Constructs an engine with no rules; every resource is valid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule in evaluation order.
    #[must_use]
    pub fn with_rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.add_rule(rule);
        self
    }

    /// Adds an exclusion.
    #[must_use]
    pub fn with_exclusion(mut self, exclusion: Arc<dyn Exclusion>) -> Self {
        self.add_exclusion(exclusion);
        self
    }

    /// Adds a rule in evaluation order.
    pub fn add_rule(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Adds an exclusion.
    pub fn add_exclusion(&mut self, exclusion: Arc<dyn Exclusion>) {
        self.exclusions.push(exclusion);
    }

    /// Returns the configured rules.
    #[must_use]
    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    /// Returns the configured exclusions.
    #[must_use]
    pub fn exclusions(&self) -> &[Arc<dyn Exclusion>] {
        &self.exclusions
    }

    /// Evaluates the resource against every rule.
    ///
    /// A valid or excluded resource is left untouched, including any schedule it
    /// already carries.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidArgument`]
    /// when the resource has no identifier and
    /// [`RuleError::MissingSchedule`] when a rule rejects the resource without
    /// scheduling its termination. Any error raised by a rule aborts the
    /// evaluation and leaves the resource untouched.
    pub fn evaluate(&self, resource: &mut Resource) -> RuleResult<Evaluation> {
        ensure_well_formed(resource)?;

        if let Some(exclusion) = self.exclusions.iter().find(|e| e.excludes(resource)) {
            debug!(
                resource = %resource.id(),
                exclusion = exclusion.name(),
                "resource excluded from cleanup"
            );
            return Ok(Evaluation::excluded(exclusion.name()));
        }

        let mut nearest: Option<(&dyn Rule, TerminationSchedule)> = None;
        for rule in &self.rules {
            let mut scratch = resource.clone();
            scratch.clear_termination();
            if rule.is_valid(&mut scratch)? {
                continue;
            }
            let Some(schedule) = scratch.termination().cloned() else {
                warn!(
                    resource = %resource.id(),
                    rule = rule.name(),
                    "rule rejected resource without scheduling termination"
                );
                return Err(RuleError::MissingSchedule {
                    rule: rule.name().to_owned(),
                    resource: resource.id().to_owned(),
                });
            };
            if nearest
                .as_ref()
                .is_none_or(|(_, current)| schedule.time() < current.time())
            {
                nearest = Some((rule.as_ref(), schedule));
            }
        }

        let Some((rule, schedule)) = nearest else {
            return Ok(Evaluation::valid());
        };
        let evaluation = Evaluation::flagged(rule.name(), schedule.time());
        info!(
            resource = %resource.id(),
            rule = rule.name(),
            termination_time = %schedule.time(),
            "resource flagged for cleanup"
        );
        resource.set_termination(Some(schedule));
        Ok(evaluation)
    }
}
