// ============================================================================
// SSO Infrastructure - In-Memory Membership Store
// File: crates/sso-infrastructure/src/memory/membership_store.rs
// ============================================================================

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use sso_core::domain::{GroupId, Membership, OrganizationId, UserId};
use sso_core::error::DomainError;
use sso_core::repositories::MembershipStore;

/// Call recorded by [`InMemoryMembershipStore`], in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipCommand {
    List {
        user_id: UserId,
        organization_id: OrganizationId,
    },
    Add(Membership),
    Remove(Membership),
}

impl MembershipCommand {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::List { .. })
    }

    pub fn organization_id(&self) -> OrganizationId {
        match self {
            Self::List {
                organization_id, ..
            } => *organization_id,
            Self::Add(m) | Self::Remove(m) => m.organization_id,
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    memberships: HashSet<Membership>,
    log: Vec<MembershipCommand>,
    fail_listing: bool,
    fail_add: HashSet<GroupId>,
    fail_remove: HashSet<GroupId>,
}

/// Membership store with idempotent add/remove, a command log and
/// per-group failure injection.
#[derive(Debug, Default)]
pub struct InMemoryMembershipStore {
    state: RwLock<StoreState>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memberships(memberships: impl IntoIterator<Item = Membership>) -> Self {
        Self {
            state: RwLock::new(StoreState {
                memberships: memberships.into_iter().collect(),
                ..StoreState::default()
            }),
        }
    }

    /// Group ids `user_id` belongs to in `organization_id`, read without logging.
    pub async fn memberships_for(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> HashSet<GroupId> {
        self.state
            .read()
            .await
            .memberships
            .iter()
            .filter(|m| m.is_scoped_to(user_id, organization_id))
            .map(|m| m.group_id)
            .collect()
    }

    pub async fn contains(&self, membership: &Membership) -> bool {
        self.state.read().await.memberships.contains(membership)
    }

    pub async fn commands(&self) -> Vec<MembershipCommand> {
        self.state.read().await.log.clone()
    }

    pub async fn mutations(&self) -> Vec<MembershipCommand> {
        self.state
            .read()
            .await
            .log
            .iter()
            .filter(|c| c.is_mutation())
            .copied()
            .collect()
    }

    pub async fn clear_log(&self) {
        self.state.write().await.log.clear();
    }

    pub async fn fail_listing(&self, fail: bool) {
        self.state.write().await.fail_listing = fail;
    }

    pub async fn fail_add_for(&self, group_id: GroupId) {
        self.state.write().await.fail_add.insert(group_id);
    }

    pub async fn fail_remove_for(&self, group_id: GroupId) {
        self.state.write().await.fail_remove.insert(group_id);
    }

    pub async fn clear_failures(&self) {
        let mut state = self.state.write().await;
        state.fail_listing = false;
        state.fail_add.clear();
        state.fail_remove.clear();
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn list_user_memberships(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<HashSet<GroupId>, DomainError> {
        let mut state = self.state.write().await;
        state.log.push(MembershipCommand::List {
            user_id,
            organization_id,
        });
        if state.fail_listing {
            error!(user_id = %user_id, organization_id = %organization_id, "Membership listing failed");
            return Err(DomainError::StoreUnavailable("membership store offline".into()));
        }

        Ok(state
            .memberships
            .iter()
            .filter(|m| m.is_scoped_to(user_id, organization_id))
            .map(|m| m.group_id)
            .collect())
    }

    async fn add_membership(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
        group_id: GroupId,
    ) -> Result<(), DomainError> {
        let membership = Membership::new(organization_id, user_id, group_id);
        let mut state = self.state.write().await;
        state.log.push(MembershipCommand::Add(membership));
        if state.fail_add.contains(&group_id) {
            error!(group_id = %group_id, user_id = %user_id, "Injected add failure");
            return Err(DomainError::StoreUnavailable(format!("add to group {} rejected", group_id)));
        }

        if state.memberships.insert(membership) {
            info!(group_id = %group_id, user_id = %user_id, "Membership added");
        } else {
            debug!(group_id = %group_id, user_id = %user_id, "Membership already present");
        }
        Ok(())
    }

    async fn remove_membership(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
        group_id: GroupId,
    ) -> Result<(), DomainError> {
        let membership = Membership::new(organization_id, user_id, group_id);
        let mut state = self.state.write().await;
        state.log.push(MembershipCommand::Remove(membership));
        if state.fail_remove.contains(&group_id) {
            error!(group_id = %group_id, user_id = %user_id, "Injected remove failure");
            return Err(DomainError::StoreUnavailable(format!("remove from group {} rejected", group_id)));
        }

        if state.memberships.remove(&membership) {
            info!(group_id = %group_id, user_id = %user_id, "Membership removed");
        } else {
            debug!(group_id = %group_id, user_id = %user_id, "Membership already absent");
        }
        Ok(())
    }
}
