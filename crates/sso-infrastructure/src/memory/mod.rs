//! In-memory adapters, used as the reference implementation of the ports
//! and by integration tests.

pub mod group_directory;
pub mod membership_store;

pub use group_directory::InMemoryGroupDirectory;
pub use membership_store::{InMemoryMembershipStore, MembershipCommand};
