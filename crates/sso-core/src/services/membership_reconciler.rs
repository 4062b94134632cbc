// ============================================================================
// SSO Core - Membership Reconciler
// File: crates/sso-core/src/services/membership_reconciler.rs
// ============================================================================
//! Converges a user's group memberships in one organization to a desired
//! list of group names, typically supplied by an identity provider at login.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::{Group, GroupId, OrganizationId, UserId};
use crate::error::{AppliedChanges, ReconcileError};
use crate::repositories::{GroupDirectory, MembershipStore};

/// Group identifiers to remove and to add.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    pub to_remove: HashSet<GroupId>,
    pub to_add: HashSet<GroupId>,
}

impl MembershipDiff {
    /// `to_remove = current - desired`, `to_add = desired - current`.
    pub fn compute(current: &HashSet<GroupId>, desired: &HashSet<GroupId>) -> Self {
        Self {
            to_remove: current.difference(desired).copied().collect(),
            to_add: desired.difference(current).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }

    pub fn len(&self) -> usize {
        self.to_remove.len() + self.to_add.len()
    }
}

/// Result of a fully successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub removed: Vec<GroupId>,
    pub added: Vec<GroupId>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    pub fn mutation_count(&self) -> usize {
        self.removed.len() + self.added.len()
    }
}

/// Resolves desired group names against a directory listing.
///
/// When a name appears more than once in `groups`, the last entry wins.
/// Unknown names are dropped. Entries from another organization are ignored.
pub fn resolve_group_names<N: AsRef<str>>(
    groups: &[Group],
    organization_id: OrganizationId,
    names: &[N],
) -> HashSet<GroupId> {
    let mut by_name: HashMap<&str, GroupId> = HashMap::with_capacity(groups.len());
    for group in groups {
        if !group.belongs_to(organization_id) {
            warn!(
                group_id = %group.id,
                group_organization_id = %group.organization_id,
                organization_id = %organization_id,
                "Directory returned a group outside the requested organization, ignoring it"
            );
            continue;
        }
        by_name.insert(group.name.as_str(), group.id);
    }

    names
        .iter()
        .filter_map(|name| {
            let name = name.as_ref();
            let resolved = by_name.get(name).copied();
            if resolved.is_none() {
                debug!(group_name = name, "Desired group not found in directory, skipping");
            }
            resolved
        })
        .collect()
}

/// Membership reconciler over a group directory and a membership store.
pub struct MembershipReconciler<D: GroupDirectory, S: MembershipStore> {
    directory: Arc<D>,
    store: Arc<S>,
}

impl<D: GroupDirectory, S: MembershipStore> MembershipReconciler<D, S> {
    pub fn new(directory: Arc<D>, store: Arc<S>) -> Self {
        Self { directory, store }
    }

    /// Computes the diff for `user_id` without issuing any mutation.
    pub async fn plan<N: AsRef<str> + Sync>(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        desired_names: &[N],
    ) -> Result<MembershipDiff, ReconcileError> {
        // 1. Directory fetch
        let groups = self
            .directory
            .list_groups(organization_id)
            .await
            .map_err(|source| {
                error!(organization_id = %organization_id, "Group directory fetch failed: {}", source);
                ReconcileError::DirectoryUnavailable {
                    organization_id,
                    source,
                }
            })?;

        // 2. Name resolution
        let desired = resolve_group_names(&groups, organization_id, desired_names);

        // 3. Current fetch
        let current = self
            .store
            .list_user_memberships(user_id, organization_id)
            .await
            .map_err(|source| {
                error!(
                    user_id = %user_id,
                    organization_id = %organization_id,
                    "Current membership fetch failed: {}", source
                );
                ReconcileError::CurrentMembershipUnavailable {
                    user_id,
                    organization_id,
                    source,
                }
            })?;

        // 4. Diff
        let diff = MembershipDiff::compute(&current, &desired);
        debug!(
            user_id = %user_id,
            organization_id = %organization_id,
            desired = desired.len(),
            current = current.len(),
            to_remove = diff.to_remove.len(),
            to_add = diff.to_add.len(),
            "Membership diff computed"
        );

        Ok(diff)
    }

    /// Applies removals, then additions, stopping at the first failed command.
    pub async fn reconcile<N: AsRef<str> + Sync>(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        desired_names: &[N],
    ) -> Result<ReconcileReport, ReconcileError> {
        let diff = self.plan(user_id, organization_id, desired_names).await?;
        let mut applied = AppliedChanges::default();

        for &group_id in &diff.to_remove {
            if let Err(source) = self
                .store
                .remove_membership(organization_id, user_id, group_id)
                .await
            {
                error!(
                    user_id = %user_id,
                    organization_id = %organization_id,
                    group_id = %group_id,
                    applied = applied.len(),
                    "Removing membership failed: {}", source
                );
                return Err(ReconcileError::RemovalFailed {
                    group_id,
                    applied,
                    source,
                });
            }
            applied.removed.push(group_id);
        }

        for &group_id in &diff.to_add {
            if let Err(source) = self
                .store
                .add_membership(organization_id, user_id, group_id)
                .await
            {
                error!(
                    user_id = %user_id,
                    organization_id = %organization_id,
                    group_id = %group_id,
                    applied = applied.len(),
                    "Adding membership failed: {}", source
                );
                return Err(ReconcileError::AdditionFailed {
                    group_id,
                    applied,
                    source,
                });
            }
            applied.added.push(group_id);
        }

        info!(
            user_id = %user_id,
            organization_id = %organization_id,
            removed = applied.removed.len(),
            added = applied.added.len(),
            "Group memberships reconciled"
        );

        Ok(ReconcileReport {
            organization_id,
            user_id,
            removed: applied.removed,
            added: applied.added,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use crate::repositories::{MockGroupDirectory, MockMembershipStore};
    use mockall::predicate::eq;
    use mockall::Sequence;

    const ORG: OrganizationId = OrganizationId(1);
    const USER: UserId = UserId(42);

    fn directory_with(groups: Vec<Group>) -> MockGroupDirectory {
        let mut directory = MockGroupDirectory::new();
        directory
            .expect_list_groups()
            .with(eq(ORG))
            .times(1)
            .returning(move |_| Ok(groups.clone()));
        directory
    }

    fn store_with_current(current: &[i64]) -> MockMembershipStore {
        let current: HashSet<GroupId> = current.iter().copied().map(GroupId).collect();
        let mut store = MockMembershipStore::new();
        store
            .expect_list_user_memberships()
            .with(eq(USER), eq(ORG))
            .times(1)
            .returning(move |_, _| Ok(current.clone()));
        store
    }

    fn standard_groups() -> Vec<Group> {
        vec![
            Group::new(GroupId(1), ORG, "G1"),
            Group::new(GroupId(2), ORG, "G2"),
            Group::new(GroupId(3), ORG, "G3"),
        ]
    }

    fn reconciler(
        directory: MockGroupDirectory,
        store: MockMembershipStore,
    ) -> MembershipReconciler<MockGroupDirectory, MockMembershipStore> {
        MembershipReconciler::new(Arc::new(directory), Arc::new(store))
    }

    #[test]
    fn test_diff_is_symmetric_difference() {
        let current: HashSet<GroupId> = HashSet::from([GroupId(1), GroupId(2)]);
        let desired: HashSet<GroupId> = HashSet::from([GroupId(2), GroupId(3)]);
        let diff = MembershipDiff::compute(&current, &desired);
        assert_eq!(diff.to_remove, HashSet::from([GroupId(1)]));
        assert_eq!(diff.to_add, HashSet::from([GroupId(3)]));
        assert_eq!(diff.len(), 2);
    }

    #[test]
    fn test_resolve_last_duplicate_name_wins() {
        let groups = vec![
            Group::new(GroupId(1), ORG, "ops"),
            Group::new(GroupId(2), ORG, "ops"),
        ];
        let resolved = resolve_group_names(&groups, ORG, &["ops"]);
        assert_eq!(resolved, HashSet::from([GroupId(2)]));
    }

    #[test]
    fn test_resolve_drops_unknown_and_duplicate_names() {
        let resolved = resolve_group_names(&standard_groups(), ORG, &["G1", "nope", "G1", "G3"]);
        assert_eq!(resolved, HashSet::from([GroupId(1), GroupId(3)]));
    }

    #[test]
    fn test_resolve_ignores_groups_of_other_organizations() {
        let groups = vec![
            Group::new(GroupId(1), ORG, "admins"),
            Group::new(GroupId(99), OrganizationId(2), "admins"),
        ];
        let resolved = resolve_group_names(&groups, ORG, &["admins"]);
        assert_eq!(resolved, HashSet::from([GroupId(1)]));
    }

    #[tokio::test]
    async fn test_reconcile_removes_g1_and_adds_g3_only() {
        let directory = directory_with(standard_groups());
        let mut store = store_with_current(&[1, 2]);
        store
            .expect_remove_membership()
            .with(eq(ORG), eq(USER), eq(GroupId(1)))
            .times(1)
            .returning(|_, _, _| Ok(()));
        store
            .expect_add_membership()
            .with(eq(ORG), eq(USER), eq(GroupId(3)))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let report = reconciler(directory, store)
            .reconcile(USER, ORG, &["G2", "G3"])
            .await
            .unwrap();

        assert_eq!(report.removed, vec![GroupId(1)]);
        assert_eq!(report.added, vec![GroupId(3)]);
        assert_eq!(report.mutation_count(), 2);
    }

    #[tokio::test]
    async fn test_directory_failure_issues_no_commands() {
        let mut directory = MockGroupDirectory::new();
        directory
            .expect_list_groups()
            .times(1)
            .returning(|_| Err(DomainError::StoreUnavailable("down".into())));
        let mut store = MockMembershipStore::new();
        store.expect_list_user_memberships().times(0);
        store.expect_remove_membership().times(0);
        store.expect_add_membership().times(0);

        let err = reconciler(directory, store)
            .reconcile(USER, ORG, &["G1"])
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::DirectoryUnavailable { organization_id, .. } if organization_id == ORG));
        assert!(err.store_untouched());
    }

    #[tokio::test]
    async fn test_current_membership_failure_issues_no_commands() {
        let directory = directory_with(standard_groups());
        let mut store = MockMembershipStore::new();
        store
            .expect_list_user_memberships()
            .times(1)
            .returning(|_, _| Err(DomainError::Timeout));
        store.expect_remove_membership().times(0);
        store.expect_add_membership().times(0);

        let err = reconciler(directory, store)
            .reconcile(USER, ORG, &["G1"])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ReconcileError::CurrentMembershipUnavailable { source: DomainError::Timeout, .. }
        ));
    }

    #[tokio::test]
    async fn test_removals_happen_before_additions() {
        let directory = directory_with(standard_groups());
        let mut store = store_with_current(&[1, 2]);
        let mut seq = Sequence::new();
        store
            .expect_remove_membership()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        store
            .expect_add_membership()
            .with(eq(ORG), eq(USER), eq(GroupId(3)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let report = reconciler(directory, store)
            .reconcile(USER, ORG, &["G3"])
            .await
            .unwrap();

        assert_eq!(report.removed.len(), 2);
        assert_eq!(report.added, vec![GroupId(3)]);
    }

    #[tokio::test]
    async fn test_removal_failure_skips_additions() {
        let directory = directory_with(standard_groups());
        let mut store = store_with_current(&[1]);
        store
            .expect_remove_membership()
            .times(1)
            .returning(|_, _, _| Err(DomainError::StoreUnavailable("write failed".into())));
        store.expect_add_membership().times(0);

        let err = reconciler(directory, store)
            .reconcile(USER, ORG, &["G2", "G3"])
            .await
            .unwrap_err();

        match err {
            ReconcileError::RemovalFailed { group_id, applied, .. } => {
                assert_eq!(group_id, GroupId(1));
                assert!(applied.is_empty());
            }
            other => panic!("expected RemovalFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_addition_failure_reports_applied_removals() {
        let directory = directory_with(standard_groups());
        let mut store = store_with_current(&[1]);
        store
            .expect_remove_membership()
            .with(eq(ORG), eq(USER), eq(GroupId(1)))
            .times(1)
            .returning(|_, _, _| Ok(()));
        store
            .expect_add_membership()
            .times(1)
            .returning(|_, _, group_id| Err(DomainError::GroupNotFound(group_id)));

        let err = reconciler(directory, store)
            .reconcile(USER, ORG, &["G2", "G3"])
            .await
            .unwrap_err();

        assert!(err.is_partial());
        let applied = err.applied().unwrap();
        assert_eq!(applied.removed, vec![GroupId(1)]);
        assert!(applied.added.is_empty());
        assert!(matches!(err, ReconcileError::AdditionFailed { .. }));
    }

    #[tokio::test]
    async fn test_empty_diff_is_noop() {
        let directory = directory_with(standard_groups());
        let mut store = store_with_current(&[2]);
        store.expect_remove_membership().times(0);
        store.expect_add_membership().times(0);

        let report = reconciler(directory, store)
            .reconcile(USER, ORG, &["G2", "unknown"])
            .await
            .unwrap();

        assert!(report.is_noop());
    }

    #[tokio::test]
    async fn test_plan_issues_no_mutations() {
        let directory = directory_with(standard_groups());
        let mut store = store_with_current(&[1, 2]);
        store.expect_remove_membership().times(0);
        store.expect_add_membership().times(0);

        let diff = reconciler(directory, store)
            .plan(USER, ORG, &["G2", "G3"])
            .await
            .unwrap();

        assert_eq!(diff.to_remove, HashSet::from([GroupId(1)]));
        assert_eq!(diff.to_add, HashSet::from([GroupId(3)]));
    }

    #[tokio::test]
    async fn test_empty_desired_list_removes_everything() {
        let directory = directory_with(standard_groups());
        let mut store = store_with_current(&[1, 3]);
        store
            .expect_remove_membership()
            .times(2)
            .returning(|_, _, _| Ok(()));
        store.expect_add_membership().times(0);

        let desired: Vec<String> = Vec::new();
        let report = reconciler(directory, store)
            .reconcile(USER, ORG, desired.as_slice())
            .await
            .unwrap();

        let mut removed = report.removed.clone();
        removed.sort();
        assert_eq!(removed, vec![GroupId(1), GroupId(3)]);
    }
}
