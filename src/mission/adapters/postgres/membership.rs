//! `PostgreSQL` site membership repository.

use super::{
    blocking::{MissionPgPool, run_blocking},
    models::MembershipRow,
    schema::site_memberships,
};
use crate::mission::{
    domain::{SiteId, SiteMembership, SiteRole, UserId},
    ports::{MembershipRepositoryError, MembershipRepositoryResult, SiteMembershipRepository},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed site membership repository.
#[derive(Debug, Clone)]
pub struct PostgresMembershipRepository {
    pool: MissionPgPool,
}

impl PostgresMembershipRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: MissionPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> MembershipRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> MembershipRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        run_blocking(
            &self.pool,
            f,
            MembershipRepositoryError::persistence,
            MembershipRepositoryError::persistence,
        )
        .await
    }
}

#[async_trait]
impl SiteMembershipRepository for PostgresMembershipRepository {
    async fn store(&self, membership: &SiteMembership) -> MembershipRepositoryResult<()> {
        let SiteMembership {
            user_id,
            site_id,
            site_role,
        } = *membership;
        let row = MembershipRow {
            user_id: user_id.into_inner(),
            site_id: site_id.into_inner(),
            site_role: site_role.as_str().to_owned(),
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(site_memberships::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        MembershipRepositoryError::DuplicateMembership { user_id, site_id }
                    }
                    _ => MembershipRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn has_membership(
        &self,
        user_id: UserId,
        site_id: SiteId,
    ) -> MembershipRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let query = site_memberships::table
                .filter(site_memberships::user_id.eq(user_id.into_inner()))
                .filter(site_memberships::site_id.eq(site_id.into_inner()));
            diesel::select(diesel::dsl::exists(query))
                .get_result::<bool>(connection)
                .map_err(MembershipRepositoryError::persistence)
        })
        .await
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> MembershipRepositoryResult<Vec<SiteMembership>> {
        self.run_blocking(move |connection| {
            let rows = site_memberships::table
                .filter(site_memberships::user_id.eq(user_id.into_inner()))
                .select(MembershipRow::as_select())
                .load::<MembershipRow>(connection)
                .map_err(MembershipRepositoryError::persistence)?;
            rows.into_iter().map(row_to_membership).collect()
        })
        .await
    }
}

fn row_to_membership(row: MembershipRow) -> MembershipRepositoryResult<SiteMembership> {
    let site_role =
        SiteRole::try_from(row.site_role.as_str()).map_err(MembershipRepositoryError::persistence)?;
    Ok(SiteMembership::new(
        UserId::from_uuid(row.user_id),
        SiteId::from_uuid(row.site_id),
        site_role,
    ))
}
