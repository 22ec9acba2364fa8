//! Traits implemented by the systems the janitor reads from and reports to.

use async_trait::async_trait;
use janitor_primitives::{Resource, ResourceType};

use crate::error::JanitorResult;

/// Lists live resources from a cloud provider.
#[async_trait]
pub trait ResourceCrawler: Send + Sync {
    /// Returns every live resource of the given kind.
    async fn resources(&self, resource_type: &ResourceType) -> JanitorResult<Vec<Resource>>;
}

/// Remembers which resources are currently marked for cleanup.
#[async_trait]
pub trait ResourceTracker: Send + Sync {
    /// Returns the marked resources of the given kind.
    async fn marked(&self, resource_type: &ResourceType) -> JanitorResult<Vec<Resource>>;

    /// Records a newly marked resource, including its termination schedule.
    async fn mark(&self, resource: &Resource) -> JanitorResult<()>;

    /// Records that a previously marked resource is no longer a candidate.
    async fn unmark(&self, resource: &Resource) -> JanitorResult<()>;
}
