//! Repository traits (ports)

pub mod group_directory;
pub mod membership_store;

pub use group_directory::GroupDirectory;
pub use membership_store::MembershipStore;

#[cfg(test)]
pub use group_directory::MockGroupDirectory;
#[cfg(test)]
pub use membership_store::MockMembershipStore;
