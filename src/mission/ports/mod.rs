//! Port contracts for the mission lifecycle.
//!
//! Ports define infrastructure-agnostic interfaces used by mission services.

pub mod directory;
pub mod membership;
pub mod repository;

pub use directory::{UserDirectory, UserDirectoryError, UserDirectoryResult};
pub use membership::{
    MembershipRepositoryError, MembershipRepositoryResult, SiteMembershipRepository,
};
pub use repository::{MissionRepository, MissionRepositoryError, MissionRepositoryResult};
