//! `PostgreSQL` adapters for mission lifecycle persistence.

mod blocking;
mod directory;
mod membership;
mod models;
mod repository;
mod schema;

pub use blocking::MissionPgPool;
pub use directory::PostgresUserDirectory;
pub use membership::PostgresMembershipRepository;
pub use repository::PostgresMissionRepository;
