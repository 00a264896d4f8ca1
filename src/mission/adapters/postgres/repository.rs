//! `PostgreSQL` repository implementation for mission lifecycle storage.

use super::{
    blocking::{MissionPgPool, run_blocking},
    models::{ClaimRow, MissionRow, NewMissionRow, PublicationRow},
    schema::{mission_claims, mission_publications, missions},
};
use crate::mission::{
    domain::{
        ClaimId, Declaration, Mission, MissionClaim, MissionDomainError, MissionId,
        MissionPublication, MissionSchedule, MissionStatus, MissionType, PersistedMissionData,
        PublicationAudience, PublicationChannel, PublicationId, PublicationScope,
        SchedulePrecision, SiteId, UserId,
    },
    ports::{MissionRepository, MissionRepositoryError, MissionRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Name of the unique index guarding one claim per mission.
const CLAIM_MISSION_UNIQUE_INDEX: &str = "idx_mission_claims_mission_unique";

/// `PostgreSQL`-backed mission repository.
#[derive(Debug, Clone)]
pub struct PostgresMissionRepository {
    pool: MissionPgPool,
}

impl PostgresMissionRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: MissionPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> MissionRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> MissionRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        run_blocking(
            &self.pool,
            f,
            MissionRepositoryError::persistence,
            MissionRepositoryError::persistence,
        )
        .await
    }
}

impl From<DieselError> for MissionRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl MissionRepository for PostgresMissionRepository {
    async fn store(&self, mission: &Mission) -> MissionRepositoryResult<()> {
        let mission_id = mission.id();
        let new_row = to_new_row(mission)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(missions::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        MissionRepositoryError::DuplicateMission(mission_id)
                    }
                    _ => MissionRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: MissionId) -> MissionRepositoryResult<Option<Mission>> {
        self.run_blocking(move |connection| {
            let row = missions::table
                .filter(missions::id.eq(id.into_inner()))
                .select(MissionRow::as_select())
                .first::<MissionRow>(connection)
                .optional()?;
            row.map(row_to_mission).transpose()
        })
        .await
    }

    async fn apply<F, T>(
        &self,
        mission_id: MissionId,
        change: F,
    ) -> MissionRepositoryResult<(Mission, T)>
    where
        F: FnOnce(&mut Mission) -> Result<T, MissionDomainError> + Send + 'static,
        T: Send + 'static,
    {
        self.run_blocking(move |connection| {
            connection.transaction::<_, MissionRepositoryError, _>(|tx| {
                let mut mission = lock_mission(tx, mission_id)?;
                let outcome = change(&mut mission)?;
                update_mission(tx, &mission)?;
                Ok((mission, outcome))
            })
        })
        .await
    }

    async fn publish<F>(
        &self,
        mission_id: MissionId,
        publish: F,
    ) -> MissionRepositoryResult<(Mission, MissionPublication)>
    where
        F: FnOnce(&mut Mission) -> Result<MissionPublication, MissionDomainError>
            + Send
            + 'static,
    {
        self.run_blocking(move |connection| {
            connection.transaction::<_, MissionRepositoryError, _>(|tx| {
                let mut mission = lock_mission(tx, mission_id)?;
                let publication = publish(&mut mission)?;
                update_mission(tx, &mission)?;
                diesel::insert_into(mission_publications::table)
                    .values(&to_publication_row(&publication))
                    .execute(tx)?;
                Ok((mission, publication))
            })
        })
        .await
    }

    async fn claim(
        &self,
        mission_id: MissionId,
        instrumentist_id: UserId,
        claimed_at: DateTime<Utc>,
    ) -> MissionRepositoryResult<(Mission, MissionClaim)> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, MissionRepositoryError, _>(|tx| {
                let mut mission = lock_mission(tx, mission_id)?;
                let claim = mission.claim(instrumentist_id, claimed_at)?;

                let existing_claims: i64 = mission_claims::table
                    .filter(mission_claims::mission_id.eq(mission_id.into_inner()))
                    .count()
                    .get_result(tx)?;
                if existing_claims > 0 {
                    return Err(MissionRepositoryError::DuplicateClaim(mission_id));
                }

                update_mission(tx, &mission)?;
                insert_claim(tx, &claim)?;
                Ok((mission, claim))
            })
        })
        .await
    }

    async fn find_claim(
        &self,
        mission_id: MissionId,
    ) -> MissionRepositoryResult<Option<MissionClaim>> {
        self.run_blocking(move |connection| {
            let row = mission_claims::table
                .filter(mission_claims::mission_id.eq(mission_id.into_inner()))
                .select(ClaimRow::as_select())
                .first::<ClaimRow>(connection)
                .optional()?;
            Ok(row.map(row_to_claim))
        })
        .await
    }

    async fn list_publications(
        &self,
        mission_id: MissionId,
    ) -> MissionRepositoryResult<Vec<MissionPublication>> {
        self.run_blocking(move |connection| {
            let rows = mission_publications::table
                .filter(mission_publications::mission_id.eq(mission_id.into_inner()))
                .order(mission_publications::published_at.asc())
                .select(PublicationRow::as_select())
                .load::<PublicationRow>(connection)?;
            rows.into_iter().map(row_to_publication).collect()
        })
        .await
    }

    async fn list_open_published(
        &self,
    ) -> MissionRepositoryResult<Vec<(Mission, Vec<MissionPublication>)>> {
        self.run_blocking(move |connection| {
            let mission_rows = missions::table
                .filter(missions::status.eq(MissionStatus::Open.as_str()))
                .order(missions::start_at.asc())
                .select(MissionRow::as_select())
                .load::<MissionRow>(connection)?;
            let mission_ids: Vec<uuid::Uuid> = mission_rows.iter().map(|row| row.id).collect();

            let publication_rows = mission_publications::table
                .filter(mission_publications::mission_id.eq_any(mission_ids))
                .order(mission_publications::published_at.asc())
                .select(PublicationRow::as_select())
                .load::<PublicationRow>(connection)?;

            let mut by_mission: HashMap<uuid::Uuid, Vec<MissionPublication>> = HashMap::new();
            for row in publication_rows {
                let key = row.mission_id;
                by_mission
                    .entry(key)
                    .or_default()
                    .push(row_to_publication(row)?);
            }

            let mut open = Vec::with_capacity(mission_rows.len());
            for row in mission_rows {
                let Some(publications) = by_mission.remove(&row.id) else {
                    continue;
                };
                open.push((row_to_mission(row)?, publications));
            }
            Ok(open)
        })
        .await
    }
}

/// Reads a mission with `SELECT ... FOR UPDATE`, holding its row lock until
/// the surrounding transaction ends.
fn lock_mission(
    connection: &mut PgConnection,
    mission_id: MissionId,
) -> MissionRepositoryResult<Mission> {
    let row = missions::table
        .filter(missions::id.eq(mission_id.into_inner()))
        .select(MissionRow::as_select())
        .for_update()
        .first::<MissionRow>(connection)
        .optional()?
        .ok_or(MissionRepositoryError::NotFound(mission_id))?;
    debug!(mission_id = %mission_id, "acquired mission row lock");
    row_to_mission(row)
}

fn update_mission(
    connection: &mut PgConnection,
    mission: &Mission,
) -> MissionRepositoryResult<()> {
    let mission_id = mission.id();
    let changes = to_new_row(mission)?;
    let updated_count = diesel::update(missions::table.find(mission_id.into_inner()))
        .set(&changes)
        .execute(connection)?;
    if updated_count == 0 {
        return Err(MissionRepositoryError::NotFound(mission_id));
    }
    Ok(())
}

fn insert_claim(
    connection: &mut PgConnection,
    claim: &MissionClaim,
) -> MissionRepositoryResult<()> {
    let row = ClaimRow {
        id: claim.id.into_inner(),
        mission_id: claim.mission_id.into_inner(),
        instrumentist_id: claim.instrumentist_id.into_inner(),
        claimed_at: claim.claimed_at,
    };
    diesel::insert_into(mission_claims::table)
        .values(&row)
        .execute(connection)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                if is_claim_unique_violation(info.as_ref()) =>
            {
                warn!(mission_id = %claim.mission_id, "claim race caught by unique index");
                MissionRepositoryError::DuplicateClaim(claim.mission_id)
            }
            _ => MissionRepositoryError::persistence(err),
        })?;
    Ok(())
}

fn is_claim_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == CLAIM_MISSION_UNIQUE_INDEX)
}

pub(super) fn to_new_row(mission: &Mission) -> MissionRepositoryResult<NewMissionRow> {
    let submission = mission
        .submission()
        .map(serde_json::to_value)
        .transpose()
        .map_err(MissionRepositoryError::persistence)?;
    let material_lines = serde_json::to_value(mission.material_lines())
        .map_err(MissionRepositoryError::persistence)?;
    let material_requests = serde_json::to_value(mission.material_requests())
        .map_err(MissionRepositoryError::persistence)?;
    let declaration = mission.declaration();

    Ok(NewMissionRow {
        id: mission.id().into_inner(),
        site_id: mission.site_id().into_inner(),
        start_at: mission.schedule().start_at(),
        end_at: mission.schedule().end_at(),
        schedule_precision: mission.schedule().precision().as_str().to_owned(),
        mission_type: mission.mission_type().as_str().to_owned(),
        status: mission.status().as_str().to_owned(),
        surgeon_id: mission.surgeon_id().into_inner(),
        instrumentist_id: mission.instrumentist_id().map(UserId::into_inner),
        created_by: mission.created_by().into_inner(),
        declared_at: declaration.map(|declared| declared.declared_at),
        declared_comment: declaration.and_then(|declared| declared.comment.clone()),
        submission,
        submitted_at: mission.submitted_at(),
        encoding_locked_at: mission.encoding_locked_at(),
        invoice_generated_at: mission.invoice_generated_at(),
        material_lines,
        material_requests,
        created_at: mission.created_at(),
        updated_at: mission.updated_at(),
    })
}

pub(super) fn row_to_mission(row: MissionRow) -> MissionRepositoryResult<Mission> {
    let MissionRow {
        id,
        site_id,
        start_at,
        end_at,
        schedule_precision,
        mission_type,
        status,
        surgeon_id,
        instrumentist_id,
        created_by,
        declared_at,
        declared_comment,
        submission,
        submitted_at,
        encoding_locked_at,
        invoice_generated_at,
        material_lines,
        material_requests,
        created_at,
        updated_at,
    } = row;

    let precision = SchedulePrecision::try_from(schedule_precision.as_str())
        .map_err(MissionRepositoryError::persistence)?;
    let schedule = MissionSchedule::new(start_at, end_at)
        .map_err(MissionRepositoryError::persistence)?
        .with_precision(precision);
    let parsed_type =
        MissionType::try_from(mission_type.as_str()).map_err(MissionRepositoryError::persistence)?;
    let parsed_status =
        MissionStatus::try_from(status.as_str()).map_err(MissionRepositoryError::persistence)?;
    let parsed_submission = submission
        .map(serde_json::from_value)
        .transpose()
        .map_err(MissionRepositoryError::persistence)?;
    let declaration = declared_at.map(|timestamp| Declaration {
        declared_at: timestamp,
        comment: declared_comment,
    });

    let data = PersistedMissionData {
        id: MissionId::from_uuid(id),
        site_id: SiteId::from_uuid(site_id),
        schedule,
        mission_type: parsed_type,
        status: parsed_status,
        surgeon_id: UserId::from_uuid(surgeon_id),
        instrumentist_id: instrumentist_id.map(UserId::from_uuid),
        created_by: UserId::from_uuid(created_by),
        declaration,
        submission: parsed_submission,
        submitted_at,
        encoding_locked_at,
        invoice_generated_at,
        material_lines: serde_json::from_value(material_lines)
            .map_err(MissionRepositoryError::persistence)?,
        material_requests: serde_json::from_value(material_requests)
            .map_err(MissionRepositoryError::persistence)?,
        created_at,
        updated_at,
    };
    Ok(Mission::from_persisted(data))
}

fn row_to_claim(row: ClaimRow) -> MissionClaim {
    MissionClaim {
        id: ClaimId::from_uuid(row.id),
        mission_id: MissionId::from_uuid(row.mission_id),
        instrumentist_id: UserId::from_uuid(row.instrumentist_id),
        claimed_at: row.claimed_at,
    }
}

pub(super) fn to_publication_row(publication: &MissionPublication) -> PublicationRow {
    PublicationRow {
        id: publication.id.into_inner(),
        mission_id: publication.mission_id.into_inner(),
        scope: publication.scope().as_str().to_owned(),
        target_id: publication.audience.target().map(UserId::into_inner),
        channel: publication.channel.as_str().to_owned(),
        published_by: publication.published_by.into_inner(),
        published_at: publication.published_at,
    }
}

pub(super) fn row_to_publication(
    row: PublicationRow,
) -> MissionRepositoryResult<MissionPublication> {
    let scope = PublicationScope::try_from(row.scope.as_str())
        .map_err(MissionRepositoryError::persistence)?;
    let audience = PublicationAudience::from_scope(scope, row.target_id.map(UserId::from_uuid))
        .map_err(MissionRepositoryError::persistence)?;
    let channel = PublicationChannel::try_from(row.channel.as_str())
        .map_err(MissionRepositoryError::persistence)?;

    Ok(MissionPublication {
        id: PublicationId::from_uuid(row.id),
        mission_id: MissionId::from_uuid(row.mission_id),
        audience,
        channel,
        published_by: UserId::from_uuid(row.published_by),
        published_at: row.published_at,
    })
}
