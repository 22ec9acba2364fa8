//! Cleanup eligibility rules for cloud resources.
//!
//! A [`Rule`] inspects one [`Resource`](janitor_primitives::Resource) and either
//! leaves it alone or schedules it for termination. The [`RuleEngine`] folds an
//! ordered rule set over a resource, honouring [`Exclusion`]s first.

#![warn(missing_docs, clippy::pedantic)]

pub mod decision;
pub mod engine;
pub mod exclusion;
pub mod instance;
mod rule;
pub mod volume;

pub use decision::{Evaluation, Verdict};
pub use engine::RuleEngine;
pub use exclusion::{Exclusion, OptOutExclusion, TagValueExclusion};
pub use instance::{NoOwnerInstanceRule, NoOwnerInstanceRuleBuilder, UntaggedInstanceRule};
pub use rule::{MAX_DAY_COUNT, Rule, RuleError, RuleResult};
pub use volume::OldDetachedVolumeRule;
