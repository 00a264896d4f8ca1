//! Mission aggregate root.

use super::{
    Actor, MaterialItemRequest, MaterialLine, MaterialLineChange, MaterialLineId, MissionClaim,
    MissionDomainError, MissionId, MissionSchedule, MissionStatus, MissionType, SiteId, UserId,
    encoding::assert_encoding_allowed, material::new_item_request,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Parameter object describing a mission to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMission {
    /// Hosting site.
    pub site_id: SiteId,
    /// Operating surgeon.
    pub surgeon_id: UserId,
    /// Planned time slot.
    pub schedule: MissionSchedule,
    /// Kind of assignment.
    pub mission_type: MissionType,
}

impl NewMission {
    /// Creates a block mission with the given schedule.
    #[must_use]
    pub const fn new(site_id: SiteId, surgeon_id: UserId, schedule: MissionSchedule) -> Self {
        Self {
            site_id,
            surgeon_id,
            schedule,
            mission_type: MissionType::Block,
        }
    }

    /// Sets the mission type.
    #[must_use]
    pub const fn with_type(mut self, mission_type: MissionType) -> Self {
        self.mission_type = mission_type;
        self
    }
}

/// Self-declaration details of a mission reported after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Declaration timestamp.
    pub declared_at: DateTime<Utc>,
    /// Free-text comment from the declaring instrumentist.
    pub comment: Option<String>,
}

/// Submission details supplied when encoding is handed in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Free-text comment.
    pub comment: Option<String>,
    /// Set when no material was used during the mission.
    pub no_material: bool,
}

/// Mission aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    id: MissionId,
    site_id: SiteId,
    schedule: MissionSchedule,
    mission_type: MissionType,
    status: MissionStatus,
    surgeon_id: UserId,
    instrumentist_id: Option<UserId>,
    created_by: UserId,
    declaration: Option<Declaration>,
    submission: Option<Submission>,
    submitted_at: Option<DateTime<Utc>>,
    encoding_locked_at: Option<DateTime<Utc>>,
    invoice_generated_at: Option<DateTime<Utc>>,
    material_lines: Vec<MaterialLine>,
    material_requests: Vec<MaterialItemRequest>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted mission aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMissionData {
    /// Persisted mission identifier.
    pub id: MissionId,
    /// Persisted site.
    pub site_id: SiteId,
    /// Persisted schedule.
    pub schedule: MissionSchedule,
    /// Persisted mission type.
    pub mission_type: MissionType,
    /// Persisted lifecycle status.
    pub status: MissionStatus,
    /// Persisted surgeon.
    pub surgeon_id: UserId,
    /// Persisted instrumentist, if assigned.
    pub instrumentist_id: Option<UserId>,
    /// Persisted creator.
    pub created_by: UserId,
    /// Persisted self-declaration details.
    pub declaration: Option<Declaration>,
    /// Persisted submission details.
    pub submission: Option<Submission>,
    /// Persisted submission timestamp.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Persisted encoding lock timestamp.
    pub encoding_locked_at: Option<DateTime<Utc>>,
    /// Persisted invoice generation timestamp.
    pub invoice_generated_at: Option<DateTime<Utc>>,
    /// Persisted material lines.
    pub material_lines: Vec<MaterialLine>,
    /// Persisted material item requests.
    pub material_requests: Vec<MaterialItemRequest>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Mission {
    /// Creates a draft mission on behalf of a manager or admin.
    ///
    /// # Errors
    ///
    /// Returns [`MissionDomainError::NotPrivileged`] when the creator is
    /// neither manager nor admin.
    pub fn new_draft(
        new_mission: NewMission,
        creator: &Actor,
        clock: &impl Clock,
    ) -> Result<Self, MissionDomainError> {
        if !creator.is_privileged() {
            return Err(MissionDomainError::NotPrivileged(creator.id()));
        }
        Ok(Self::build(new_mission, creator.id(), MissionStatus::Draft, clock.utc()))
    }

    /// Creates a mission self-declared by the instrumentist who performed it.
    ///
    /// The declarer becomes the assigned instrumentist and the mission
    /// starts in [`MissionStatus::Declared`].
    ///
    /// # Errors
    ///
    /// Returns [`MissionDomainError::NotInstrumentist`] when the declarer is
    /// not an instrumentist.
    pub fn declare(
        new_mission: NewMission,
        declarer: &Actor,
        comment: Option<String>,
        clock: &impl Clock,
    ) -> Result<Self, MissionDomainError> {
        if !declarer.is_instrumentist() {
            return Err(MissionDomainError::NotInstrumentist(declarer.id()));
        }
        let timestamp = clock.utc();
        let mut mission =
            Self::build(new_mission, declarer.id(), MissionStatus::Declared, timestamp);
        mission.instrumentist_id = Some(declarer.id());
        mission.declaration = Some(Declaration {
            declared_at: timestamp,
            comment,
        });
        Ok(mission)
    }

    fn build(
        new_mission: NewMission,
        created_by: UserId,
        status: MissionStatus,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let NewMission {
            site_id,
            surgeon_id,
            schedule,
            mission_type,
        } = new_mission;
        Self {
            id: MissionId::new(),
            site_id,
            schedule,
            mission_type,
            status,
            surgeon_id,
            instrumentist_id: None,
            created_by,
            declaration: None,
            submission: None,
            submitted_at: None,
            encoding_locked_at: None,
            invoice_generated_at: None,
            material_lines: Vec::new(),
            material_requests: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a mission from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedMissionData) -> Self {
        Self {
            id: data.id,
            site_id: data.site_id,
            schedule: data.schedule,
            mission_type: data.mission_type,
            status: data.status,
            surgeon_id: data.surgeon_id,
            instrumentist_id: data.instrumentist_id,
            created_by: data.created_by,
            declaration: data.declaration,
            submission: data.submission,
            submitted_at: data.submitted_at,
            encoding_locked_at: data.encoding_locked_at,
            invoice_generated_at: data.invoice_generated_at,
            material_lines: data.material_lines,
            material_requests: data.material_requests,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the mission identifier.
    #[must_use]
    pub const fn id(&self) -> MissionId {
        self.id
    }

    /// Returns the hosting site.
    #[must_use]
    pub const fn site_id(&self) -> SiteId {
        self.site_id
    }

    /// Returns the planned time slot.
    #[must_use]
    pub const fn schedule(&self) -> &MissionSchedule {
        &self.schedule
    }

    /// Returns the kind of assignment.
    #[must_use]
    pub const fn mission_type(&self) -> MissionType {
        self.mission_type
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> MissionStatus {
        self.status
    }

    /// Returns the operating surgeon.
    #[must_use]
    pub const fn surgeon_id(&self) -> UserId {
        self.surgeon_id
    }

    /// Returns the assigned instrumentist, if any.
    #[must_use]
    pub const fn instrumentist_id(&self) -> Option<UserId> {
        self.instrumentist_id
    }

    /// Returns the creator.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns self-declaration details, if the mission was declared.
    #[must_use]
    pub const fn declaration(&self) -> Option<&Declaration> {
        self.declaration.as_ref()
    }

    /// Returns submission details, if submitted.
    #[must_use]
    pub const fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub const fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    /// Returns the time instrumentist encoding was locked.
    #[must_use]
    pub const fn encoding_locked_at(&self) -> Option<DateTime<Utc>> {
        self.encoding_locked_at
    }

    /// Returns the time an invoice was generated for the mission.
    #[must_use]
    pub const fn invoice_generated_at(&self) -> Option<DateTime<Utc>> {
        self.invoice_generated_at
    }

    /// Returns encoded material lines.
    #[must_use]
    pub fn material_lines(&self) -> &[MaterialLine] {
        &self.material_lines
    }

    /// Returns material item requests.
    #[must_use]
    pub fn material_requests(&self) -> &[MaterialItemRequest] {
        &self.material_requests
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Opens a draft mission for claiming.
    ///
    /// # Errors
    ///
    /// Returns [`MissionDomainError::InvalidStatusTransition`] unless the
    /// mission is a draft.
    pub fn publish(&mut self, clock: &impl Clock) -> Result<(), MissionDomainError> {
        self.transition_to(MissionStatus::Open, clock.utc())
    }

    /// Assigns the mission to the claiming instrumentist.
    ///
    /// Callers must hold the per-mission lock while invoking this so that the
    /// status check and the write happen atomically.
    ///
    /// # Errors
    ///
    /// Returns [`MissionDomainError::InvalidStatusTransition`] when the
    /// mission is not open or [`MissionDomainError::AlreadyAssigned`] when
    /// an instrumentist is already set.
    pub fn claim(
        &mut self,
        instrumentist_id: UserId,
        claimed_at: DateTime<Utc>,
    ) -> Result<MissionClaim, MissionDomainError> {
        if self.instrumentist_id.is_some() {
            return Err(MissionDomainError::AlreadyAssigned(self.id));
        }
        self.transition_to(MissionStatus::Assigned, claimed_at)?;
        self.instrumentist_id = Some(instrumentist_id);
        Ok(MissionClaim::new(self.id, instrumentist_id, claimed_at))
    }

    /// Marks the mission as started by its assigned instrumentist.
    ///
    /// # Errors
    ///
    /// Returns [`MissionDomainError::NotAssignedInstrumentist`] for any other
    /// actor, [`MissionDomainError::InvalidStatusTransition`] unless the
    /// mission is assigned, or [`MissionDomainError::EncodingBeforeStart`]
    /// before the scheduled start.
    pub fn start(&mut self, actor: &Actor, clock: &impl Clock) -> Result<(), MissionDomainError> {
        self.ensure_assigned_to(actor)?;
        self.ensure_transition(MissionStatus::InProgress)?;
        let now = clock.utc();
        assert_encoding_allowed(self, actor, now)?;
        self.transition_to(MissionStatus::InProgress, now)
    }

    /// Hands in the mission encoding.
    ///
    /// Locks further instrumentist encoding.
    ///
    /// # Errors
    ///
    /// Returns [`MissionDomainError::NotAssignedInstrumentist`] when the
    /// actor is neither privileged nor the assigned instrumentist,
    /// [`MissionDomainError::InvalidStatusTransition`] unless the mission is
    /// assigned or in progress, or [`MissionDomainError::EncodingBeforeStart`]
    /// when the encoding window is still closed.
    pub fn submit(
        &mut self,
        actor: &Actor,
        submission: Submission,
        clock: &impl Clock,
    ) -> Result<(), MissionDomainError> {
        if !actor.is_privileged() {
            self.ensure_assigned_to(actor)?;
        }
        self.ensure_transition(MissionStatus::Submitted)?;
        let now = clock.utc();
        assert_encoding_allowed(self, actor, now)?;
        self.transition_to(MissionStatus::Submitted, now)?;
        self.submission = Some(submission);
        self.submitted_at = Some(now);
        self.encoding_locked_at = Some(now);
        Ok(())
    }

    /// Accepts submitted encoding.
    ///
    /// # Errors
    ///
    /// Returns [`MissionDomainError::NotPrivileged`] for non-managers or
    /// [`MissionDomainError::InvalidStatusTransition`] unless submitted.
    pub fn validate(
        &mut self,
        actor: &Actor,
        clock: &impl Clock,
    ) -> Result<(), MissionDomainError> {
        if !actor.is_privileged() {
            return Err(MissionDomainError::NotPrivileged(actor.id()));
        }
        self.transition_to(MissionStatus::Validated, clock.utc())
    }

    /// Adds a material line to the encoding.
    ///
    /// # Errors
    ///
    /// Returns a [`MissionDomainError`] when the actor may not encode the
    /// mission right now.
    pub fn add_material_line(
        &mut self,
        actor: &Actor,
        line: MaterialLine,
        clock: &impl Clock,
    ) -> Result<(), MissionDomainError> {
        let now = clock.utc();
        self.ensure_encodable(actor, now)?;
        self.material_lines.push(line);
        self.updated_at = now;
        Ok(())
    }

    /// Updates an encoded material line.
    ///
    /// # Errors
    ///
    /// Returns a [`MissionDomainError`] when the actor may not encode the
    /// mission, the line does not exist, or the change is invalid.
    pub fn update_material_line(
        &mut self,
        actor: &Actor,
        line_id: MaterialLineId,
        change: MaterialLineChange,
        clock: &impl Clock,
    ) -> Result<(), MissionDomainError> {
        let now = clock.utc();
        self.ensure_encodable(actor, now)?;
        let mission_id = self.id;
        let line = self
            .material_lines
            .iter_mut()
            .find(|line| line.id() == line_id)
            .ok_or(MissionDomainError::MaterialLineNotFound {
                mission_id,
                line_id,
            })?;
        line.apply(change)?;
        self.updated_at = now;
        Ok(())
    }

    /// Removes an encoded material line.
    ///
    /// # Errors
    ///
    /// Returns a [`MissionDomainError`] when the actor may not encode the
    /// mission or the line does not exist.
    pub fn remove_material_line(
        &mut self,
        actor: &Actor,
        line_id: MaterialLineId,
        clock: &impl Clock,
    ) -> Result<MaterialLine, MissionDomainError> {
        let now = clock.utc();
        self.ensure_encodable(actor, now)?;
        let position = self
            .material_lines
            .iter()
            .position(|line| line.id() == line_id)
            .ok_or(MissionDomainError::MaterialLineNotFound {
                mission_id: self.id,
                line_id,
            })?;
        let removed = self.material_lines.remove(position);
        self.updated_at = now;
        Ok(removed)
    }

    /// Records a request for a material item missing from the catalogue.
    ///
    /// # Errors
    ///
    /// Returns a [`MissionDomainError`] when the actor may not encode the
    /// mission or the label is blank.
    pub fn request_material_item(
        &mut self,
        actor: &Actor,
        label: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), MissionDomainError> {
        let now = clock.utc();
        self.ensure_encodable(actor, now)?;
        let request = new_item_request(label.into(), actor.id(), now)?;
        self.material_requests.push(request);
        self.updated_at = now;
        Ok(())
    }

    fn ensure_encodable(
        &self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<(), MissionDomainError> {
        if actor.is_privileged() {
            if !matches!(
                self.status,
                MissionStatus::Assigned | MissionStatus::InProgress | MissionStatus::Submitted
            ) {
                return Err(self.not_encodable());
            }
            return Ok(());
        }

        self.ensure_assigned_to(actor)?;
        if !self.status.is_active_assignment() {
            return Err(self.not_encodable());
        }
        if self.encoding_locked_at.is_some() {
            return Err(MissionDomainError::EncodingLocked(self.id));
        }
        assert_encoding_allowed(self, actor, now)
    }

    const fn not_encodable(&self) -> MissionDomainError {
        MissionDomainError::NotEncodable {
            mission_id: self.id,
            status: self.status,
        }
    }

    fn ensure_assigned_to(&self, actor: &Actor) -> Result<(), MissionDomainError> {
        if self.instrumentist_id == Some(actor.id()) {
            Ok(())
        } else {
            Err(MissionDomainError::NotAssignedInstrumentist {
                mission_id: self.id,
                user_id: actor.id(),
            })
        }
    }

    const fn ensure_transition(&self, target: MissionStatus) -> Result<(), MissionDomainError> {
        if self.status.can_transition_to(target) {
            Ok(())
        } else {
            Err(MissionDomainError::InvalidStatusTransition {
                mission_id: self.id,
                from: self.status,
                to: target,
            })
        }
    }

    fn transition_to(
        &mut self,
        target: MissionStatus,
        now: DateTime<Utc>,
    ) -> Result<(), MissionDomainError> {
        self.ensure_transition(target)?;
        self.status = target;
        self.updated_at = now;
        Ok(())
    }
}
