//! `PostgreSQL` integration tests for mission persistence.

use super::helpers::{TestDatabase, database, draft_mission};
use crate::test_helpers::{FixedClock, monday_morning};
use chrono::Duration;
use eyre::{bail, ensure};
use rstest::rstest;
use staffline::mission::{
    adapters::postgres::PostgresMissionRepository,
    domain::{
        Actor, MaterialLine, MissionId, MissionPublication, MissionStatus, PublicationAudience,
        PublicationChannel, PublicationId, Role, SiteId, UserId,
    },
    ports::{MissionRepository, MissionRepositoryError},
};
use std::sync::Arc;

fn publication(mission_id: MissionId, audience: PublicationAudience) -> MissionPublication {
    MissionPublication {
        id: PublicationId::new(),
        mission_id,
        audience,
        channel: PublicationChannel::InApp,
        published_by: UserId::new(),
        published_at: monday_morning(),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stored_mission_round_trips(database: TestDatabase) -> eyre::Result<()> {
    let db = database;
    let repo = PostgresMissionRepository::new(db.pool.clone());
    let clock = FixedClock::at(monday_morning());
    let mission = draft_mission(&clock, SiteId::new(), UserId::new()).map_err(eyre::Report::msg)?;

    repo.store(&mission).await?;

    ensure!(
        repo.find_by_id(mission.id()).await? == Some(mission.clone()),
        "stored mission differs"
    );
    let Err(err) = repo.store(&mission).await else {
        bail!("duplicate store should fail");
    };
    ensure!(
        matches!(err, MissionRepositoryError::DuplicateMission(id) if id == mission.id()),
        "unexpected error {err}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn apply_persists_encoding(database: TestDatabase) -> eyre::Result<()> {
    let db = database;
    let repo = PostgresMissionRepository::new(db.pool.clone());
    let clock = Arc::new(FixedClock::at(monday_morning()));
    let holder = Actor::new(UserId::new(), Role::Instrumentist);
    let mission = draft_mission(&clock, SiteId::new(), UserId::new()).map_err(eyre::Report::msg)?;
    repo.store(&mission).await?;
    let publisher = Arc::clone(&clock);
    repo.apply(mission.id(), move |draft| draft.publish(&*publisher))
        .await?;
    repo.claim(mission.id(), holder.id(), monday_morning()).await?;

    clock.advance(Duration::hours(2));
    let encoder = Arc::clone(&clock);
    let (assigned, ()) = repo
        .apply(mission.id(), move |assigned| {
            let line = MaterialLine::new("Suture kit", 2)?;
            assigned.add_material_line(&holder, line, &*encoder)
        })
        .await?;

    let Some(reloaded) = repo.find_by_id(mission.id()).await? else {
        bail!("mission missing after apply");
    };
    ensure!(reloaded == assigned, "material encoding not persisted");
    ensure!(reloaded.material_lines().len() == 1, "line not stored");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn apply_to_unknown_mission_is_not_found(database: TestDatabase) -> eyre::Result<()> {
    let db = database;
    let repo = PostgresMissionRepository::new(db.pool.clone());
    let unknown = MissionId::new();

    let result = repo.apply(unknown, |_| Ok(())).await;

    ensure!(
        matches!(result, Err(MissionRepositoryError::NotFound(id)) if id == unknown),
        "expected NotFound"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_apply_writes_nothing(database: TestDatabase) -> eyre::Result<()> {
    let db = database;
    let repo = PostgresMissionRepository::new(db.pool.clone());
    let clock = FixedClock::at(monday_morning());
    let mission = draft_mission(&clock, SiteId::new(), UserId::new()).map_err(eyre::Report::msg)?;
    repo.store(&mission).await?;
    let stranger = Actor::new(UserId::new(), Role::Instrumentist);
    let late = Arc::new(FixedClock::at(monday_morning() + Duration::hours(2)));

    let result = repo
        .apply(mission.id(), move |draft| draft.start(&stranger, &*late))
        .await;

    ensure!(
        matches!(result, Err(MissionRepositoryError::Rejected(_))),
        "start on a draft should be rejected"
    );
    ensure!(
        repo.find_by_id(mission.id()).await? == Some(mission),
        "rejected change was written"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn publication_and_status_are_written_together(database: TestDatabase) -> eyre::Result<()> {
    let db = database;
    let repo = PostgresMissionRepository::new(db.pool.clone());
    let clock = Arc::new(FixedClock::at(monday_morning()));
    let mission = draft_mission(&clock, SiteId::new(), UserId::new()).map_err(eyre::Report::msg)?;
    repo.store(&mission).await?;
    let target = UserId::new();
    let record = publication(mission.id(), PublicationAudience::Targeted(target));
    let expected = record.clone();
    let publisher = Arc::clone(&clock);

    repo.publish(mission.id(), move |draft| {
        draft.publish(&*publisher)?;
        Ok(record)
    })
    .await?;

    ensure!(
        repo.list_publications(mission.id()).await? == vec![expected.clone()],
        "publication not stored"
    );
    let open = repo.list_open_published().await?;
    let [(listed, publications)] = open.as_slice() else {
        bail!("expected exactly one open mission, got {}", open.len());
    };
    ensure!(listed.status() == MissionStatus::Open, "status not written");
    ensure!(publications == &vec![expected], "publications not grouped");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn republishing_an_open_mission_records_nothing(database: TestDatabase) -> eyre::Result<()> {
    let db = database;
    let repo = PostgresMissionRepository::new(db.pool.clone());
    let clock = Arc::new(FixedClock::at(monday_morning()));
    let mission = draft_mission(&clock, SiteId::new(), UserId::new()).map_err(eyre::Report::msg)?;
    repo.store(&mission).await?;
    for _ in 0..2 {
        let publisher = Arc::clone(&clock);
        let record = publication(mission.id(), PublicationAudience::Pool);
        let _ = repo
            .publish(mission.id(), move |draft| {
                draft.publish(&*publisher)?;
                Ok(record)
            })
            .await;
    }

    ensure!(
        repo.list_publications(mission.id()).await?.len() == 1,
        "second publish of an open mission recorded a publication"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn claim_on_draft_leaves_no_claim_row(database: TestDatabase) -> eyre::Result<()> {
    let db = database;
    let repo = PostgresMissionRepository::new(db.pool.clone());
    let clock = FixedClock::at(monday_morning());
    let mission = draft_mission(&clock, SiteId::new(), UserId::new()).map_err(eyre::Report::msg)?;
    repo.store(&mission).await?;

    let result = repo
        .claim(mission.id(), UserId::new(), monday_morning())
        .await;

    ensure!(
        matches!(result, Err(MissionRepositoryError::Rejected(_))),
        "draft claim should be rejected"
    );
    ensure!(
        db.count_claims(mission.id().into_inner())
            .map_err(eyre::Report::msg)?
            == 0,
        "claim row written for rejected claim"
    );
    ensure!(
        repo.find_claim(mission.id()).await?.is_none(),
        "claim visible after rejection"
    );
    Ok(())
}
