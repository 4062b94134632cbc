//! # SSO Core
//! 
//! Domain entities, repository traits, and the group membership reconciler.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{AppliedChanges, DomainError, ReconcileError};
pub use services::{MembershipDiff, MembershipReconciler, ReconcileReport};
