//! Group directory trait (port)

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{Group, OrganizationId};
use crate::error::DomainError;

/// Source of truth mapping group names to identifiers within an organization.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    /// Lists every group of `organization_id`, in the directory's own order.
    async fn list_groups(&self, organization_id: OrganizationId) -> Result<Vec<Group>, DomainError>;
}
