//! Repository port for mission persistence, publication, and claiming.

use crate::mission::domain::{
    Mission, MissionClaim, MissionDomainError, MissionId, MissionPublication, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for mission repository operations.
pub type MissionRepositoryResult<T> = Result<T, MissionRepositoryError>;

/// Mission persistence contract.
#[async_trait]
pub trait MissionRepository: Send + Sync {
    /// Stores a new mission.
    ///
    /// # Errors
    ///
    /// Returns [`MissionRepositoryError::DuplicateMission`] when the mission
    /// ID already exists.
    async fn store(&self, mission: &Mission) -> MissionRepositoryResult<()>;

    /// Finds a mission by identifier.
    ///
    /// Returns `None` when the mission does not exist.
    async fn find_by_id(&self, id: MissionId) -> MissionRepositoryResult<Option<Mission>>;

    /// Applies `change` to the stored mission under an exclusive per-mission
    /// lock and persists the result.
    ///
    /// The mission is re-read once the lock is held, so `change` always sees
    /// the latest committed state. Nothing is written when `change` fails.
    ///
    /// # Errors
    ///
    /// Returns [`MissionRepositoryError::NotFound`] for unknown missions or
    /// [`MissionRepositoryError::Rejected`] when `change` refuses the
    /// mission.
    async fn apply<F, T>(
        &self,
        mission_id: MissionId,
        change: F,
    ) -> MissionRepositoryResult<(Mission, T)>
    where
        F: FnOnce(&mut Mission) -> Result<T, MissionDomainError> + Send + 'static,
        T: Send + 'static;

    /// Publishes a mission under its exclusive lock.
    ///
    /// `publish` receives the freshly read mission, applies the transition,
    /// and returns the publication to record. The mission update and the
    /// publication insert commit together.
    ///
    /// # Errors
    ///
    /// Returns [`MissionRepositoryError::NotFound`] for unknown missions or
    /// [`MissionRepositoryError::Rejected`] when the locked mission cannot
    /// be published.
    async fn publish<F>(
        &self,
        mission_id: MissionId,
        publish: F,
    ) -> MissionRepositoryResult<(Mission, MissionPublication)>
    where
        F: FnOnce(&mut Mission) -> Result<MissionPublication, MissionDomainError>
            + Send
            + 'static;

    /// Claims an open mission for `instrumentist_id`.
    ///
    /// Implementations hold an exclusive per-mission lock while they re-read
    /// the mission, apply [`Mission::claim`], write the mission, and insert
    /// the claim record. Exactly one concurrent caller succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`MissionRepositoryError::NotFound`] for unknown missions,
    /// [`MissionRepositoryError::Rejected`] when the locked mission refuses
    /// the claim, or [`MissionRepositoryError::DuplicateClaim`] when a claim
    /// record already exists.
    async fn claim(
        &self,
        mission_id: MissionId,
        instrumentist_id: UserId,
        claimed_at: DateTime<Utc>,
    ) -> MissionRepositoryResult<(Mission, MissionClaim)>;

    /// Returns the claim recorded for a mission, if any.
    async fn find_claim(&self, mission_id: MissionId)
    -> MissionRepositoryResult<Option<MissionClaim>>;

    /// Returns every publication of a mission, oldest first.
    async fn list_publications(
        &self,
        mission_id: MissionId,
    ) -> MissionRepositoryResult<Vec<MissionPublication>>;

    /// Returns open missions that have at least one publication, paired with
    /// their publications.
    async fn list_open_published(
        &self,
    ) -> MissionRepositoryResult<Vec<(Mission, Vec<MissionPublication>)>>;
}

/// Errors returned by mission repository implementations.
#[derive(Debug, Clone, Error)]
pub enum MissionRepositoryError {
    /// A mission with the same identifier already exists.
    #[error("duplicate mission identifier: {0}")]
    DuplicateMission(MissionId),

    /// The mission was not found.
    #[error("mission not found: {0}")]
    NotFound(MissionId),

    /// A claim record already exists for the mission.
    #[error("mission {0} has already been claimed")]
    DuplicateClaim(MissionId),

    /// The mission refused a change applied under its lock.
    #[error(transparent)]
    Rejected(#[from] MissionDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl MissionRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
