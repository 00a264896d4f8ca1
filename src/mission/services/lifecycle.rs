//! Service layer orchestrating the mission lifecycle.
//!
//! Provides [`MissionLifecycleService`], which hands domain transitions to
//! the repository port. The repository re-reads the mission under a
//! per-mission lock, applies the transition, and writes the result, so
//! concurrent requests on one mission never overwrite each other.

use super::error::{MissionServiceError, MissionServiceResult};
use crate::mission::{
    domain::{
        Actor, MaterialLine, MaterialLineChange, MaterialLineId, Mission, MissionAction,
        MissionClaim, MissionDomainError, MissionId, MissionPublication, MissionSchedule,
        MissionType, NewMission, PublicationAudience, PublicationChannel, PublicationId,
        PublicationPolicy, PublicationScope, SchedulePrecision, SiteId, Submission, UserId,
        allowed_actions,
    },
    ports::{MissionRepository, MissionRepositoryError, SiteMembershipRepository, UserDirectory},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Request payload for creating or declaring a mission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMissionRequest {
    site_id: SiteId,
    surgeon_id: UserId,
    start_at: Option<DateTime<Utc>>,
    end_at: Option<DateTime<Utc>>,
    precision: SchedulePrecision,
    mission_type: MissionType,
}

impl CreateMissionRequest {
    /// Creates an unscheduled block mission request.
    #[must_use]
    pub const fn new(site_id: SiteId, surgeon_id: UserId) -> Self {
        Self {
            site_id,
            surgeon_id,
            start_at: None,
            end_at: None,
            precision: SchedulePrecision::Exact,
            mission_type: MissionType::Block,
        }
    }

    /// Sets the scheduled time slot.
    #[must_use]
    pub const fn with_schedule(mut self, start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> Self {
        self.start_at = Some(start_at);
        self.end_at = Some(end_at);
        self
    }

    /// Sets the scheduled start only.
    #[must_use]
    pub const fn with_start(mut self, start_at: DateTime<Utc>) -> Self {
        self.start_at = Some(start_at);
        self
    }

    /// Sets the schedule precision.
    #[must_use]
    pub const fn with_precision(mut self, precision: SchedulePrecision) -> Self {
        self.precision = precision;
        self
    }

    /// Sets the mission type.
    #[must_use]
    pub const fn with_type(mut self, mission_type: MissionType) -> Self {
        self.mission_type = mission_type;
        self
    }

    fn into_new_mission(self) -> Result<NewMission, MissionDomainError> {
        let schedule =
            MissionSchedule::new(self.start_at, self.end_at)?.with_precision(self.precision);
        Ok(NewMission::new(self.site_id, self.surgeon_id, schedule).with_type(self.mission_type))
    }
}

/// Request payload for publishing a mission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishMissionRequest {
    mission_id: MissionId,
    scope: PublicationScope,
    target: Option<UserId>,
    channel: PublicationChannel,
}

impl PublishMissionRequest {
    /// Creates a pool publication request.
    #[must_use]
    pub const fn pool(mission_id: MissionId) -> Self {
        Self {
            mission_id,
            scope: PublicationScope::Pool,
            target: None,
            channel: PublicationChannel::InApp,
        }
    }

    /// Creates a targeted publication request.
    #[must_use]
    pub const fn targeted(mission_id: MissionId, target: UserId) -> Self {
        Self {
            mission_id,
            scope: PublicationScope::Targeted,
            target: Some(target),
            channel: PublicationChannel::InApp,
        }
    }

    /// Creates a request from raw scope and optional target, as received
    /// from the request layer.
    #[must_use]
    pub const fn new(
        mission_id: MissionId,
        scope: PublicationScope,
        target: Option<UserId>,
    ) -> Self {
        Self {
            mission_id,
            scope,
            target,
            channel: PublicationChannel::InApp,
        }
    }

    /// Sets the announcement channel.
    #[must_use]
    pub const fn with_channel(mut self, channel: PublicationChannel) -> Self {
        self.channel = channel;
        self
    }
}

/// Request payload for encoding a material line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddMaterialLineRequest {
    item: String,
    quantity: u32,
    comment: Option<String>,
}

impl AddMaterialLineRequest {
    /// Creates a request for `quantity` units of `item`.
    #[must_use]
    pub fn new(item: impl Into<String>, quantity: u32) -> Self {
        Self {
            item: item.into(),
            quantity,
            comment: None,
        }
    }

    /// Attaches a comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Mission lifecycle orchestration service.
#[derive(Clone)]
pub struct MissionLifecycleService<R, M, D, C>
where
    R: MissionRepository,
    M: SiteMembershipRepository,
    D: UserDirectory,
    C: Clock + Send + Sync,
{
    missions: Arc<R>,
    memberships: Arc<M>,
    directory: Arc<D>,
    clock: Arc<C>,
}

impl<R, M, D, C> MissionLifecycleService<R, M, D, C>
where
    R: MissionRepository,
    M: SiteMembershipRepository,
    D: UserDirectory,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new mission lifecycle service.
    #[must_use]
    pub const fn new(
        missions: Arc<R>,
        memberships: Arc<M>,
        directory: Arc<D>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            missions,
            memberships,
            directory,
            clock,
        }
    }

    /// Creates a draft mission on behalf of a manager or admin.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError`] when the creator is not privileged,
    /// the surgeon does not exist, the schedule is invalid, or persistence
    /// fails.
    pub async fn create_draft(
        &self,
        creator: &Actor,
        request: CreateMissionRequest,
    ) -> MissionServiceResult<Mission> {
        self.require_user(request.surgeon_id).await?;
        let mission = Mission::new_draft(request.into_new_mission()?, creator, &*self.clock)?;
        self.missions.store(&mission).await?;
        info!(mission_id = %mission.id(), creator = %creator.id(), "mission drafted");
        Ok(mission)
    }

    /// Records a mission self-declared by an instrumentist.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError`] when the declarer is not an
    /// instrumentist, the surgeon does not exist, the schedule is invalid,
    /// or persistence fails.
    pub async fn declare_mission(
        &self,
        declarer: &Actor,
        request: CreateMissionRequest,
        comment: Option<String>,
    ) -> MissionServiceResult<Mission> {
        self.require_user(request.surgeon_id).await?;
        let mission =
            Mission::declare(request.into_new_mission()?, declarer, comment, &*self.clock)?;
        self.missions.store(&mission).await?;
        info!(mission_id = %mission.id(), declarer = %declarer.id(), "mission declared");
        Ok(mission)
    }

    /// Publishes a draft mission to the pool or to one instrumentist.
    ///
    /// The draft check, the mission update, and the publication record all
    /// run under the mission lock, so concurrent publishes of one draft
    /// record a single publication.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError`] when the publisher is not
    /// privileged, the mission or target does not exist, a targeted request
    /// lacks a target, the mission is not a draft, or persistence fails.
    pub async fn publish_mission(
        &self,
        publisher: &Actor,
        request: PublishMissionRequest,
    ) -> MissionServiceResult<MissionPublication> {
        if !publisher.is_privileged() {
            return Err(MissionDomainError::NotPrivileged(publisher.id()).into());
        }
        let PublishMissionRequest {
            mission_id,
            scope,
            target,
            channel,
        } = request;

        let audience = PublicationAudience::from_scope(scope, target)?;
        self.load(mission_id).await?;
        if let Some(target_id) = audience.target() {
            let target_user = self.require_user(target_id).await?;
            if !target_user.is_instrumentist() {
                return Err(MissionServiceError::TargetNotInstrumentist(target_id));
            }
        }

        let clock = Arc::clone(&self.clock);
        let published_by = publisher.id();
        let (_, publication) = self
            .missions
            .publish(mission_id, move |mission| {
                mission.publish(&*clock)?;
                Ok(MissionPublication {
                    id: PublicationId::new(),
                    mission_id,
                    audience,
                    channel,
                    published_by,
                    published_at: mission.updated_at(),
                })
            })
            .await?;
        info!(
            mission_id = %mission_id,
            scope = publication.scope().as_str(),
            "mission published"
        );
        Ok(publication)
    }

    /// Claims an open mission for the calling instrumentist.
    ///
    /// Concurrent claims on the same mission are serialised by the
    /// repository; exactly one succeeds and every other caller receives a
    /// conflict.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError`] when the caller is not an
    /// instrumentist, the mission does not exist, the mission is not open,
    /// it is already assigned or claimed, or persistence fails.
    pub async fn claim_mission(
        &self,
        instrumentist: &Actor,
        mission_id: MissionId,
    ) -> MissionServiceResult<Mission> {
        if !instrumentist.is_instrumentist() {
            return Err(MissionDomainError::NotInstrumentist(instrumentist.id()).into());
        }
        let claimed_at = self.clock.utc();
        match self
            .missions
            .claim(mission_id, instrumentist.id(), claimed_at)
            .await
        {
            Ok((mission, claim)) => {
                info!(
                    mission_id = %mission_id,
                    instrumentist = %claim.instrumentist_id,
                    "mission claimed"
                );
                Ok(mission)
            }
            Err(err) => {
                warn!(
                    mission_id = %mission_id,
                    instrumentist = %instrumentist.id(),
                    error = %err,
                    "mission claim rejected"
                );
                Err(err.into())
            }
        }
    }

    /// Marks an assigned mission as started.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError`] when the caller is not the assigned
    /// instrumentist, the mission is not assigned, the encoding window is
    /// closed, or persistence fails.
    pub async fn start_mission(
        &self,
        actor: &Actor,
        mission_id: MissionId,
    ) -> MissionServiceResult<Mission> {
        let starter = *actor;
        let (mission, ()) = self
            .modify(mission_id, move |mission, clock| mission.start(&starter, clock))
            .await?;
        info!(mission_id = %mission_id, actor = %starter.id(), "mission started");
        Ok(mission)
    }

    /// Hands in the mission encoding.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError`] when the caller is neither the
    /// assigned instrumentist nor privileged, the mission is not assigned or
    /// in progress, the encoding window is closed, or persistence fails.
    pub async fn submit_mission(
        &self,
        actor: &Actor,
        mission_id: MissionId,
        submission: Submission,
    ) -> MissionServiceResult<Mission> {
        let submitter = *actor;
        let result = self
            .modify(mission_id, move |mission, clock| {
                mission.submit(&submitter, submission, clock)
            })
            .await;
        match result {
            Ok((mission, ())) => {
                info!(mission_id = %mission_id, actor = %submitter.id(), "mission submitted");
                Ok(mission)
            }
            Err(err) => {
                warn!(
                    mission_id = %mission_id,
                    actor = %submitter.id(),
                    error = %err,
                    "mission submission rejected"
                );
                Err(err)
            }
        }
    }

    /// Accepts submitted encoding.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError`] when the caller is not privileged,
    /// the mission is not submitted, or persistence fails.
    pub async fn validate_mission(
        &self,
        actor: &Actor,
        mission_id: MissionId,
    ) -> MissionServiceResult<Mission> {
        let validator = *actor;
        let (mission, ()) = self
            .modify(mission_id, move |mission, clock| mission.validate(&validator, clock))
            .await?;
        info!(mission_id = %mission_id, actor = %validator.id(), "mission validated");
        Ok(mission)
    }

    /// Encodes a material line.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError`] when the line is invalid, the caller
    /// may not encode the mission right now, or persistence fails.
    pub async fn add_material_line(
        &self,
        actor: &Actor,
        mission_id: MissionId,
        request: AddMaterialLineRequest,
    ) -> MissionServiceResult<MaterialLine> {
        let AddMaterialLineRequest {
            item,
            quantity,
            comment,
        } = request;
        let mut line = MaterialLine::new(item, quantity)?;
        if let Some(text) = comment {
            line = line.with_comment(text);
        }
        let added = line.clone();
        let encoder = *actor;
        self.modify(mission_id, move |mission, clock| {
            mission.add_material_line(&encoder, line, clock)
        })
        .await?;
        Ok(added)
    }

    /// Changes the quantity or comment of an encoded material line.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError`] when the line does not exist, the
    /// change is invalid, the caller may not encode the mission right now,
    /// or persistence fails.
    pub async fn update_material_line(
        &self,
        actor: &Actor,
        mission_id: MissionId,
        line_id: MaterialLineId,
        change: MaterialLineChange,
    ) -> MissionServiceResult<Mission> {
        let encoder = *actor;
        let (mission, ()) = self
            .modify(mission_id, move |mission, clock| {
                mission.update_material_line(&encoder, line_id, change, clock)
            })
            .await?;
        Ok(mission)
    }

    /// Removes an encoded material line.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError`] when the line does not exist, the
    /// caller may not encode the mission right now, or persistence fails.
    pub async fn remove_material_line(
        &self,
        actor: &Actor,
        mission_id: MissionId,
        line_id: MaterialLineId,
    ) -> MissionServiceResult<MaterialLine> {
        let encoder = *actor;
        let (_, removed) = self
            .modify(mission_id, move |mission, clock| {
                mission.remove_material_line(&encoder, line_id, clock)
            })
            .await?;
        Ok(removed)
    }

    /// Asks for a material item missing from the catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError`] when the label is blank, the caller
    /// may not encode the mission right now, or persistence fails.
    pub async fn request_material_item(
        &self,
        actor: &Actor,
        mission_id: MissionId,
        label: String,
    ) -> MissionServiceResult<Mission> {
        let requester = *actor;
        let (mission, ()) = self
            .modify(mission_id, move |mission, clock| {
                mission.request_material_item(&requester, label, clock)
            })
            .await?;
        Ok(mission)
    }

    /// Returns the actions `viewer` may perform on a mission.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError`] when the mission does not exist or
    /// the lookup fails.
    pub async fn get_allowed_actions(
        &self,
        viewer: &Actor,
        mission_id: MissionId,
    ) -> MissionServiceResult<BTreeSet<MissionAction>> {
        let mission = self.load(mission_id).await?;
        Ok(allowed_actions(&mission, viewer))
    }

    /// Lists the open missions offered to an instrumentist.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError`] when the caller is not an
    /// instrumentist or a lookup fails.
    pub async fn list_offers(&self, candidate: &Actor) -> MissionServiceResult<Vec<Mission>> {
        if !candidate.is_instrumentist() {
            return Err(MissionDomainError::NotInstrumentist(candidate.id()).into());
        }
        let member_sites = self
            .memberships
            .list_for_user(candidate.id())
            .await?
            .into_iter()
            .map(|membership| membership.site_id)
            .collect();
        let policy = PublicationPolicy::for_candidate(*candidate, member_sites)?;

        let offers = self
            .missions
            .list_open_published()
            .await?
            .into_iter()
            .filter(|(mission, publications)| policy.is_eligible(mission, publications))
            .map(|(mission, _)| mission)
            .collect();
        Ok(offers)
    }

    /// Finds a mission by identifier.
    ///
    /// Returns `Ok(None)` when the mission does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError::Repository`] when the lookup fails.
    pub async fn find_by_id(&self, mission_id: MissionId) -> MissionServiceResult<Option<Mission>> {
        Ok(self.missions.find_by_id(mission_id).await?)
    }

    /// Returns the claim recorded for a mission, if any.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError::Repository`] when the mission does not
    /// exist or the lookup fails.
    pub async fn find_claim(
        &self,
        mission_id: MissionId,
    ) -> MissionServiceResult<Option<MissionClaim>> {
        Ok(self.missions.find_claim(mission_id).await?)
    }

    /// Returns every publication of a mission.
    ///
    /// # Errors
    ///
    /// Returns [`MissionServiceError::Repository`] when the mission does not
    /// exist or the lookup fails.
    pub async fn list_publications(
        &self,
        mission_id: MissionId,
    ) -> MissionServiceResult<Vec<MissionPublication>> {
        Ok(self.missions.list_publications(mission_id).await?)
    }

    async fn load(&self, mission_id: MissionId) -> MissionServiceResult<Mission> {
        self.missions
            .find_by_id(mission_id)
            .await?
            .ok_or_else(|| MissionRepositoryError::NotFound(mission_id).into())
    }

    async fn require_user(&self, user_id: UserId) -> MissionServiceResult<Actor> {
        self.directory
            .find_by_id(user_id)
            .await?
            .ok_or(MissionServiceError::UserNotFound(user_id))
    }

    /// Applies `change` while the repository holds the mission lock.
    async fn modify<F, T>(
        &self,
        mission_id: MissionId,
        change: F,
    ) -> MissionServiceResult<(Mission, T)>
    where
        F: FnOnce(&mut Mission, &C) -> Result<T, MissionDomainError> + Send + 'static,
        T: Send + 'static,
    {
        let clock = Arc::clone(&self.clock);
        let applied = self
            .missions
            .apply(mission_id, move |mission| change(mission, &*clock))
            .await?;
        Ok(applied)
    }
}
