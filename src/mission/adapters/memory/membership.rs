//! In-memory site membership repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::mission::{
    domain::{SiteId, SiteMembership, UserId},
    ports::{MembershipRepositoryError, MembershipRepositoryResult, SiteMembershipRepository},
};

/// Thread-safe in-memory membership repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMembershipRepository {
    memberships: Arc<RwLock<HashMap<UserId, Vec<SiteMembership>>>>,
}

impl InMemoryMembershipRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl std::fmt::Display) -> MembershipRepositoryError {
    MembershipRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl SiteMembershipRepository for InMemoryMembershipRepository {
    async fn store(&self, membership: &SiteMembership) -> MembershipRepositoryResult<()> {
        let mut memberships = self.memberships.write().map_err(poisoned)?;
        let user_memberships = memberships.entry(membership.user_id).or_default();
        if user_memberships
            .iter()
            .any(|existing| existing.site_id == membership.site_id)
        {
            return Err(MembershipRepositoryError::DuplicateMembership {
                user_id: membership.user_id,
                site_id: membership.site_id,
            });
        }
        user_memberships.push(*membership);
        Ok(())
    }

    async fn has_membership(
        &self,
        user_id: UserId,
        site_id: SiteId,
    ) -> MembershipRepositoryResult<bool> {
        let memberships = self.memberships.read().map_err(poisoned)?;
        Ok(memberships
            .get(&user_id)
            .is_some_and(|entries| entries.iter().any(|entry| entry.site_id == site_id)))
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> MembershipRepositoryResult<Vec<SiteMembership>> {
        let memberships = self.memberships.read().map_err(poisoned)?;
        Ok(memberships.get(&user_id).cloned().unwrap_or_default())
    }
}
