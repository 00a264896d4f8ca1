//! Blocking operation helpers shared by the `PostgreSQL` mission adapters.
//!
//! Diesel is synchronous, so every query runs on the blocking thread pool
//! to keep the async executor's workers free.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use tokio::task::JoinError;

/// `PostgreSQL` connection pool type used by the mission adapters.
pub type MissionPgPool = Pool<ConnectionManager<PgConnection>>;

/// Checks out a connection and runs `f` on the blocking thread pool.
///
/// Pool checkout failures and join errors are mapped into the caller's
/// error type.
pub(super) async fn run_blocking<F, T, E>(
    pool: &MissionPgPool,
    f: F,
    map_pool_err: fn(PoolError) -> E,
    map_join_err: fn(JoinError) -> E,
) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(map_pool_err)?;
        f(&mut connection)
    })
    .await
    .map_err(map_join_err)?
}
