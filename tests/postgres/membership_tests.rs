//! `PostgreSQL` integration tests for site memberships.

use super::helpers::{TestDatabase, database};
use eyre::ensure;
use rstest::rstest;
use staffline::mission::{
    adapters::postgres::PostgresMembershipRepository,
    domain::{Actor, Role, SiteId, SiteMembership, SiteRole, UserId},
    ports::{MembershipRepositoryError, SiteMembershipRepository},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn membership_round_trips_and_rejects_duplicates(
    database: TestDatabase,
) -> eyre::Result<()> {
    let db = database;
    let repo = PostgresMembershipRepository::new(db.pool.clone());
    let member = db
        .insert_user(Actor::new(UserId::new(), Role::Instrumentist))
        .map_err(eyre::Report::msg)?;
    let site_id = SiteId::new();
    let membership = SiteMembership::new(member.id(), site_id, SiteRole::Instrumentist);

    repo.store(&membership).await?;
    let duplicate = repo.store(&membership).await;

    ensure!(
        matches!(
            duplicate,
            Err(MembershipRepositoryError::DuplicateMembership { .. })
        ),
        "duplicate membership accepted"
    );
    ensure!(repo.has_membership(member.id(), site_id).await?, "membership missing");
    ensure!(
        !repo.has_membership(member.id(), SiteId::new()).await?,
        "unexpected membership"
    );
    ensure!(
        repo.list_for_user(member.id()).await? == vec![membership],
        "listing mismatch"
    );
    Ok(())
}
