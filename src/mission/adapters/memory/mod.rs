//! In-memory adapters for mission lifecycle tests and embedding.

mod directory;
mod membership;
mod mission;

pub use directory::InMemoryUserDirectory;
pub use membership::InMemoryMembershipRepository;
pub use mission::InMemoryMissionRepository;
