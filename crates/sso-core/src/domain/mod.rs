//! # SSO Core - Domain Module
//! 
//! Domain entities for group membership reconciliation.

pub mod ids;
pub mod group;
pub mod membership;

// Re-export all entities
pub use ids::{GroupId, OrganizationId, UserId};
pub use group::Group;
pub use membership::Membership;
