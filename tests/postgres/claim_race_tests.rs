//! `PostgreSQL` integration tests for concurrent claims.

use super::helpers::{TestDatabase, database};
use crate::test_helpers::monday_morning;
use chrono::Duration;
use eyre::{bail, ensure};
use rstest::rstest;
use staffline::mission::{
    domain::{Actor, MissionStatus, Role, SiteId, Submission, UserId},
    services::{AddMaterialLineRequest, CreateMissionRequest, ErrorKind, PublishMissionRequest},
};
use std::sync::Arc;
use tokio::task::JoinSet;

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_claims_leave_one_claim_row(database: TestDatabase) -> eyre::Result<()> {
    let db = database;
    let (service, _clock) = db.service();
    let service = Arc::new(service);
    let manager = Actor::new(UserId::new(), Role::Manager);
    let surgeon = db
        .insert_user(Actor::new(UserId::new(), Role::Surgeon))
        .map_err(eyre::Report::msg)?;
    let mission = service
        .create_draft(&manager, CreateMissionRequest::new(SiteId::new(), surgeon.id()))
        .await?;
    service
        .publish_mission(&manager, PublishMissionRequest::pool(mission.id()))
        .await?;

    let mut tasks = JoinSet::new();
    for _ in 0..12 {
        let claimer = Arc::clone(&service);
        let candidate = Actor::new(UserId::new(), Role::Instrumentist);
        let mission_id = mission.id();
        tasks.spawn(async move { claimer.claim_mission(&candidate, mission_id).await });
    }

    let mut winners = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(claimed) => winners.push(claimed),
            Err(err) => ensure!(err.kind() == ErrorKind::Conflict, "unexpected error {err}"),
        }
    }

    let [winner] = winners.as_slice() else {
        bail!("expected one winner, got {}", winners.len());
    };
    ensure!(winner.status() == MissionStatus::Assigned, "winner not assigned");
    ensure!(
        db.count_claims(mission.id().into_inner())
            .map_err(eyre::Report::msg)?
            == 1,
        "expected exactly one claim row"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_publishes_leave_one_publication_row(
    database: TestDatabase,
) -> eyre::Result<()> {
    let db = database;
    let (service, _clock) = db.service();
    let service = Arc::new(service);
    let manager = Actor::new(UserId::new(), Role::Manager);
    let surgeon = db
        .insert_user(Actor::new(UserId::new(), Role::Surgeon))
        .map_err(eyre::Report::msg)?;
    let mission = service
        .create_draft(&manager, CreateMissionRequest::new(SiteId::new(), surgeon.id()))
        .await?;

    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let publisher = Arc::clone(&service);
        let mission_id = mission.id();
        tasks.spawn(async move {
            publisher
                .publish_mission(&manager, PublishMissionRequest::pool(mission_id))
                .await
        });
    }

    let mut published = 0_usize;
    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(_) => published += 1,
            Err(err) => ensure!(err.kind() == ErrorKind::Conflict, "unexpected error {err}"),
        }
    }

    ensure!(published == 1, "expected one publish, got {published}");
    ensure!(
        service.list_publications(mission.id()).await?.len() == 1,
        "expected exactly one publication row"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn submission_survives_concurrent_material_edits(
    database: TestDatabase,
) -> eyre::Result<()> {
    let db = database;
    let (service, clock) = db.service();
    let service = Arc::new(service);
    let manager = Actor::new(UserId::new(), Role::Manager);
    let surgeon = db
        .insert_user(Actor::new(UserId::new(), Role::Surgeon))
        .map_err(eyre::Report::msg)?;
    let holder = Actor::new(UserId::new(), Role::Instrumentist);
    let start = monday_morning() + Duration::hours(1);
    let mission = service
        .create_draft(
            &manager,
            CreateMissionRequest::new(SiteId::new(), surgeon.id())
                .with_schedule(start, start + Duration::hours(3)),
        )
        .await?;
    service
        .publish_mission(&manager, PublishMissionRequest::pool(mission.id()))
        .await?;
    service.claim_mission(&holder, mission.id()).await?;
    clock.set(start + Duration::hours(1));

    let mut tasks = JoinSet::new();
    let submitter = Arc::clone(&service);
    let mission_id = mission.id();
    tasks.spawn(async move {
        submitter
            .submit_mission(&holder, mission_id, Submission::default())
            .await
            .map(|_| false)
    });
    for index in 0..6 {
        let editor = Arc::clone(&service);
        tasks.spawn(async move {
            let request = AddMaterialLineRequest::new(format!("Gauze {index}"), 1);
            editor
                .add_material_line(&holder, mission_id, request)
                .await
                .map(|_| true)
        });
    }

    let mut added = 0_usize;
    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(true) => added += 1,
            Ok(false) => {}
            Err(err) => ensure!(err.kind() == ErrorKind::Conflict, "unexpected error {err}"),
        }
    }

    let Some(stored) = service.find_by_id(mission_id).await? else {
        bail!("mission missing after the race");
    };
    ensure!(stored.status() == MissionStatus::Submitted, "submission reverted");
    ensure!(stored.encoding_locked_at().is_some(), "encoding lock lost");
    ensure!(stored.material_lines().len() == added, "material lines lost");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lifecycle_scenario_against_postgres(database: TestDatabase) -> eyre::Result<()> {
    let db = database;
    let (service, clock) = db.service();
    let manager = Actor::new(UserId::new(), Role::Manager);
    let surgeon = db
        .insert_user(Actor::new(UserId::new(), Role::Surgeon))
        .map_err(eyre::Report::msg)?;
    let first = Actor::new(UserId::new(), Role::Instrumentist);
    let second = Actor::new(UserId::new(), Role::Instrumentist);
    let start = monday_morning() + Duration::hours(1);
    let mission = service
        .create_draft(
            &manager,
            CreateMissionRequest::new(SiteId::new(), surgeon.id())
                .with_schedule(start, start + Duration::hours(3)),
        )
        .await?;

    service
        .publish_mission(&manager, PublishMissionRequest::pool(mission.id()))
        .await?;
    service.claim_mission(&first, mission.id()).await?;
    let Err(conflict) = service.claim_mission(&second, mission.id()).await else {
        bail!("second claim should fail");
    };
    ensure!(conflict.kind() == ErrorKind::Conflict, "expected CONFLICT");

    let Err(early) = service
        .submit_mission(&first, mission.id(), Submission::default())
        .await
    else {
        bail!("early submit should fail");
    };
    ensure!(early.kind() == ErrorKind::Conflict, "expected CONFLICT");

    clock.set(start);
    let submitted = service
        .submit_mission(&first, mission.id(), Submission::default())
        .await?;
    ensure!(submitted.status() == MissionStatus::Submitted, "expected SUBMITTED");
    Ok(())
}
