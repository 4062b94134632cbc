// ============================================================================
// SSO Core - Group Entity
// File: crates/sso-core/src/domain/group.rs
// Description: Directory group, resolved by name during reconciliation
// ============================================================================

use serde::{Deserialize, Serialize};

use super::ids::{GroupId, OrganizationId};

/// Group entity as listed by the group directory.
///
/// `name` is only unique within an organization and is used for resolution;
/// `id` is the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub organization_id: OrganizationId,
    pub name: String,
}

impl Group {
    pub fn new(id: GroupId, organization_id: OrganizationId, name: impl Into<String>) -> Self {
        Self {
            id,
            organization_id,
            name: name.into(),
        }
    }

    pub fn belongs_to(&self, organization_id: OrganizationId) -> bool {
        self.organization_id == organization_id
    }
}
