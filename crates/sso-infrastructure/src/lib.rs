//! # SSO Infrastructure
//! 
//! Adapters implementing the group directory and membership store ports.

pub mod memory;

pub use memory::{InMemoryGroupDirectory, InMemoryMembershipStore, MembershipCommand};
