//! In-memory integration tests for the publish, claim, and submit flow.

use super::helpers::{World, world};
use chrono::Duration;
use eyre::{bail, ensure};
use rstest::rstest;
use staffline::mission::{
    domain::{MissionAction, MissionStatus, PublicationScope, Submission},
    services::{ErrorKind, PublishMissionRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn publish_claim_and_submit_follow_the_state_machine(world: World) -> eyre::Result<()> {
    let first = world.new_instrumentist()?;
    let second = world.new_instrumentist()?;
    let mission_id = world.draft().await?;

    let publication = world
        .service
        .publish_mission(&world.manager, PublishMissionRequest::pool(mission_id))
        .await?;
    let Some(open) = world.service.find_by_id(mission_id).await? else {
        bail!("mission disappeared after publish");
    };
    ensure!(open.status() == MissionStatus::Open, "expected OPEN");
    ensure!(publication.scope() == PublicationScope::Pool, "expected POOL");
    ensure!(
        world.service.list_publications(mission_id).await?.len() == 1,
        "expected one publication row"
    );

    let assigned = world.service.claim_mission(&first, mission_id).await?;
    ensure!(assigned.status() == MissionStatus::Assigned, "expected ASSIGNED");
    ensure!(
        assigned.instrumentist_id() == Some(first.id()),
        "first claimer not assigned"
    );
    ensure!(
        world.service.find_claim(mission_id).await?.is_some(),
        "claim row missing"
    );

    let Err(second_claim) = world.service.claim_mission(&second, mission_id).await else {
        bail!("second claim should fail");
    };
    ensure!(second_claim.kind() == ErrorKind::Conflict, "expected CONFLICT");

    let Err(early) = world
        .service
        .submit_mission(&first, mission_id, Submission::default())
        .await
    else {
        bail!("submit before start should fail");
    };
    ensure!(early.kind() == ErrorKind::Conflict, "expected CONFLICT before start");

    world.clock.advance(Duration::hours(1));
    let submitted = world
        .service
        .submit_mission(&first, mission_id, Submission::default())
        .await?;
    ensure!(submitted.status() == MissionStatus::Submitted, "expected SUBMITTED");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_claims_keep_failing(world: World) -> eyre::Result<()> {
    let winner = world.new_instrumentist()?;
    let mission_id = world.publish(PublishMissionRequest::pool).await?;
    world.service.claim_mission(&winner, mission_id).await?;

    for _ in 0..3 {
        let retry = world.new_instrumentist()?;
        for claimer in [retry, winner] {
            let Err(err) = world.service.claim_mission(&claimer, mission_id).await else {
                bail!("claim on an assigned mission must fail");
            };
            ensure!(err.kind() == ErrorKind::Conflict, "expected CONFLICT, got {err}");
        }
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn allowed_actions_are_stable_for_unchanged_inputs(world: World) -> eyre::Result<()> {
    let viewer = world.new_instrumentist()?;
    let mission_id = world.publish(PublishMissionRequest::pool).await?;

    let first = world.service.get_allowed_actions(&viewer, mission_id).await?;
    let second = world.service.get_allowed_actions(&viewer, mission_id).await?;

    ensure!(first == second, "action sets differ between calls");
    ensure!(first.contains(&MissionAction::Claim), "open mission should be claimable");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn manager_validates_after_submission(world: World) -> eyre::Result<()> {
    let holder = world.new_instrumentist()?;
    let mission_id = world.publish(PublishMissionRequest::pool).await?;
    world.service.claim_mission(&holder, mission_id).await?;
    world.clock.set(crate::test_helpers::monday_morning() + Duration::hours(6));

    world
        .service
        .submit_mission(
            &holder,
            mission_id,
            Submission {
                comment: Some("no complications".to_owned()),
                no_material: true,
            },
        )
        .await?;
    let validated = world.service.validate_mission(&world.manager, mission_id).await?;

    ensure!(validated.status() == MissionStatus::Validated, "expected VALIDATED");
    ensure!(
        validated.submission().is_some_and(|s| s.no_material),
        "submission details lost"
    );
    Ok(())
}
