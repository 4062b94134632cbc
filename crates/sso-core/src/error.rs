//! Domain errors

use thiserror::Error;

use crate::domain::{GroupId, OrganizationId, UserId};

/// Errors raised by the group directory and membership store adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store operation timed out")]
    Timeout,

    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),
}

/// Membership commands that took effect before a reconciliation stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedChanges {
    pub removed: Vec<GroupId>,
    pub added: Vec<GroupId>,
}

impl AppliedChanges {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    pub fn len(&self) -> usize {
        self.removed.len() + self.added.len()
    }
}

/// Failure outcome of a reconciliation.
///
/// Fetch failures leave the store untouched. Mutation failures carry the
/// commands already applied, so callers can tell a partial reconciliation
/// apart from one that changed nothing. Any variant may be retried by
/// re-running the whole reconciliation: add and remove commands are
/// idempotent and the diff is recomputed from fresh state.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Group directory unavailable for organization {organization_id}: {source}")]
    DirectoryUnavailable {
        organization_id: OrganizationId,
        #[source]
        source: DomainError,
    },

    #[error("Current memberships unavailable for user {user_id} in organization {organization_id}: {source}")]
    CurrentMembershipUnavailable {
        user_id: UserId,
        organization_id: OrganizationId,
        #[source]
        source: DomainError,
    },

    #[error("Failed to remove membership in group {group_id}: {source}")]
    RemovalFailed {
        group_id: GroupId,
        applied: AppliedChanges,
        #[source]
        source: DomainError,
    },

    #[error("Failed to add membership in group {group_id}: {source}")]
    AdditionFailed {
        group_id: GroupId,
        applied: AppliedChanges,
        #[source]
        source: DomainError,
    },
}

impl ReconcileError {
    /// Group whose mutation command failed, if any.
    pub fn failed_group(&self) -> Option<GroupId> {
        match self {
            Self::RemovalFailed { group_id, .. } | Self::AdditionFailed { group_id, .. } => {
                Some(*group_id)
            }
            _ => None,
        }
    }

    /// Commands applied before the failure. Empty for fetch failures.
    pub fn applied(&self) -> Option<&AppliedChanges> {
        match self {
            Self::RemovalFailed { applied, .. } | Self::AdditionFailed { applied, .. } => {
                Some(applied)
            }
            _ => None,
        }
    }

    /// True when some, but not all, mutation commands took effect.
    pub fn is_partial(&self) -> bool {
        self.applied().is_some_and(|applied| !applied.is_empty())
    }

    /// True when no mutation command took effect.
    pub fn store_untouched(&self) -> bool {
        !self.is_partial()
    }

    pub fn domain_error(&self) -> &DomainError {
        match self {
            Self::DirectoryUnavailable { source, .. }
            | Self::CurrentMembershipUnavailable { source, .. }
            | Self::RemovalFailed { source, .. }
            | Self::AdditionFailed { source, .. } => source,
        }
    }
}
