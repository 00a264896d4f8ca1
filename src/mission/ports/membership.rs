//! Repository port for site memberships.

use crate::mission::domain::{SiteId, SiteMembership, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for membership repository operations.
pub type MembershipRepositoryResult<T> = Result<T, MembershipRepositoryError>;

/// Site membership persistence contract.
#[async_trait]
pub trait SiteMembershipRepository: Send + Sync {
    /// Stores a membership.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipRepositoryError::DuplicateMembership`] when the
    /// user already belongs to the site.
    async fn store(&self, membership: &SiteMembership) -> MembershipRepositoryResult<()>;

    /// Returns whether `user_id` belongs to `site_id`.
    async fn has_membership(
        &self,
        user_id: UserId,
        site_id: SiteId,
    ) -> MembershipRepositoryResult<bool>;

    /// Returns every membership of a user.
    async fn list_for_user(&self, user_id: UserId)
    -> MembershipRepositoryResult<Vec<SiteMembership>>;
}

/// Errors returned by membership repository implementations.
#[derive(Debug, Clone, Error)]
pub enum MembershipRepositoryError {
    /// The user already belongs to the site.
    #[error("user {user_id} already belongs to site {site_id}")]
    DuplicateMembership {
        /// Member user.
        user_id: UserId,
        /// Site.
        site_id: SiteId,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl MembershipRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
