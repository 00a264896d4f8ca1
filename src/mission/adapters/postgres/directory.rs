//! `PostgreSQL` user directory.

use super::{
    blocking::{MissionPgPool, run_blocking},
    models::UserRow,
    schema::users,
};
use crate::mission::{
    domain::{Actor, EmploymentType, Role, UserId},
    ports::{UserDirectory, UserDirectoryError, UserDirectoryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;

/// `PostgreSQL`-backed read-only user directory.
#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    pool: MissionPgPool,
}

impl PostgresUserDirectory {
    /// Creates a new directory from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: MissionPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_by_id(&self, id: UserId) -> UserDirectoryResult<Option<Actor>> {
        run_blocking(
            &self.pool,
            move |connection| {
                let row = users::table
                    .filter(users::id.eq(id.into_inner()))
                    .select(UserRow::as_select())
                    .first::<UserRow>(connection)
                    .optional()
                    .map_err(UserDirectoryError::persistence)?;
                row.map(row_to_actor).transpose()
            },
            UserDirectoryError::persistence,
            UserDirectoryError::persistence,
        )
        .await
    }
}

pub(super) fn row_to_actor(row: UserRow) -> UserDirectoryResult<Actor> {
    let role = Role::try_from(row.role.as_str()).map_err(UserDirectoryError::persistence)?;
    let employment = EmploymentType::try_from(row.employment_type.as_str())
        .map_err(UserDirectoryError::persistence)?;
    Ok(Actor::new(UserId::from_uuid(row.id), role).with_employment(employment))
}
