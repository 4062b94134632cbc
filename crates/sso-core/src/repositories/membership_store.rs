//! Membership store trait (port)

use std::collections::HashSet;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{GroupId, OrganizationId, UserId};
use crate::error::DomainError;

/// Source of truth for which groups a user belongs to.
///
/// `add_membership` and `remove_membership` must be idempotent: adding a
/// present membership or removing an absent one succeeds without change.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn list_user_memberships(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<HashSet<GroupId>, DomainError>;

    async fn add_membership(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
        group_id: GroupId,
    ) -> Result<(), DomainError>;

    async fn remove_membership(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
        group_id: GroupId,
    ) -> Result<(), DomainError>;
}
