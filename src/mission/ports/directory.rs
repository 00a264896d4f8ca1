//! Read-only port onto the platform user directory.

use crate::mission::domain::{Actor, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user directory lookups.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// Lookup contract for users referenced by missions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user with their role and employment arrangement.
    ///
    /// Returns `None` when the user does not exist.
    async fn find_by_id(&self, id: UserId) -> UserDirectoryResult<Option<Actor>>;
}

/// Errors returned by user directory implementations.
#[derive(Debug, Clone, Error)]
pub enum UserDirectoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserDirectoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
