// ============================================================================
// SSO Core - Membership Entity
// File: crates/sso-core/src/domain/membership.rs
// Description: User-Group assignment within one organization
// ============================================================================

use serde::{Deserialize, Serialize};

use super::ids::{GroupId, OrganizationId, UserId};

/// Membership relation. The tuple itself is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Membership {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub group_id: GroupId,
}

impl Membership {
    pub fn new(organization_id: OrganizationId, user_id: UserId, group_id: GroupId) -> Self {
        Self {
            organization_id,
            user_id,
            group_id,
        }
    }

    /// True when this membership belongs to `user_id` inside `organization_id`.
    pub fn is_scoped_to(&self, user_id: UserId, organization_id: OrganizationId) -> bool {
        self.user_id == user_id && self.organization_id == organization_id
    }
}
