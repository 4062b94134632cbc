//! Domain services (business logic)

pub mod membership_reconciler;

pub use membership_reconciler::{
    resolve_group_names, MembershipDiff, MembershipReconciler, ReconcileReport,
};
