// ============================================================================
// SSO Infrastructure - In-Memory Group Directory
// File: crates/sso-infrastructure/src/memory/group_directory.rs
// ============================================================================

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error};

use sso_core::domain::{Group, OrganizationId};
use sso_core::error::DomainError;
use sso_core::repositories::GroupDirectory;

#[derive(Debug, Default)]
struct DirectoryState {
    groups: Vec<Group>,
    unavailable: bool,
}

/// Group directory backed by an ordered list of groups.
#[derive(Debug, Default)]
pub struct InMemoryGroupDirectory {
    state: RwLock<DirectoryState>,
}

impl InMemoryGroupDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups(groups: impl IntoIterator<Item = Group>) -> Self {
        Self {
            state: RwLock::new(DirectoryState {
                groups: groups.into_iter().collect(),
                unavailable: false,
            }),
        }
    }

    /// Appends a group; listing order follows insertion order.
    pub async fn insert(&self, group: Group) {
        self.state.write().await.groups.push(group);
    }

    /// Makes every listing fail until reset.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }
}

#[async_trait]
impl GroupDirectory for InMemoryGroupDirectory {
    async fn list_groups(&self, organization_id: OrganizationId) -> Result<Vec<Group>, DomainError> {
        let state = self.state.read().await;
        if state.unavailable {
            error!(organization_id = %organization_id, "Group directory is unavailable");
            return Err(DomainError::StoreUnavailable("group directory offline".into()));
        }

        let groups: Vec<Group> = state
            .groups
            .iter()
            .filter(|g| g.belongs_to(organization_id))
            .cloned()
            .collect();
        debug!(organization_id = %organization_id, count = groups.len(), "Listed groups");
        Ok(groups)
    }
}
