//! Rules that apply to compute instances.

mod no_owner;
mod untagged;

pub use no_owner::{
    DEFAULT_OWNER_TAG, NO_OWNER_REASON, NoOwnerInstanceRule, NoOwnerInstanceRuleBuilder,
};
pub use untagged::UntaggedInstanceRule;

/// Provider state of an instance that has finished booting.
pub(crate) const RUNNING: &str = "running";
