//! Offer eligibility for published missions.

use super::{
    Actor, Mission, MissionDomainError, MissionPublication, MissionStatus, PublicationScope, SiteId,
};
use std::collections::BTreeSet;

/// Decides which open missions an instrumentist may see and claim.
///
/// A mission is eligible when a targeted publication names the candidate,
/// or when a pool publication exists and the candidate is a freelancer or
/// belongs to the mission's site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationPolicy {
    candidate: Actor,
    member_sites: BTreeSet<SiteId>,
}

impl PublicationPolicy {
    /// Builds the policy for one candidate and the sites they belong to.
    ///
    /// # Errors
    ///
    /// Returns [`MissionDomainError::NotInstrumentist`] when the candidate
    /// does not hold the instrumentist role.
    pub fn for_candidate(
        candidate: Actor,
        member_sites: BTreeSet<SiteId>,
    ) -> Result<Self, MissionDomainError> {
        if !candidate.is_instrumentist() {
            return Err(MissionDomainError::NotInstrumentist(candidate.id()));
        }
        Ok(Self {
            candidate,
            member_sites,
        })
    }

    /// Returns the candidate the policy evaluates.
    #[must_use]
    pub const fn candidate(&self) -> &Actor {
        &self.candidate
    }

    /// Returns whether the candidate may see and claim `mission`.
    ///
    /// Missions that are not open, or were never published, are never
    /// eligible.
    #[must_use]
    pub fn is_eligible(&self, mission: &Mission, publications: &[MissionPublication]) -> bool {
        if mission.status() != MissionStatus::Open {
            return false;
        }
        let targeted = publications
            .iter()
            .any(|publication| publication.targets(self.candidate.id()));
        if targeted {
            return true;
        }
        let pooled = publications
            .iter()
            .any(|publication| publication.scope() == PublicationScope::Pool);
        pooled && (self.candidate.is_freelancer() || self.member_sites.contains(&mission.site_id()))
    }
}
