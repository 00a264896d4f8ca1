//! When steps for mission lifecycle BDD scenarios.

use super::world::{MissionWorld, run_async};
use chrono::Duration;
use rstest_bdd_macros::when;
use staffline::mission::{
    domain::{PublicationScope, Submission},
    services::PublishMissionRequest,
};

#[when("the manager publishes the mission to the pool")]
fn publish_to_pool(world: &mut MissionWorld) -> Result<(), eyre::Report> {
    let mission_id = world.mission_id()?;
    let result = run_async(
        world
            .service
            .publish_mission(&world.manager, PublishMissionRequest::pool(mission_id)),
    );
    match result {
        Ok(_) => world.reload(),
        Err(err) => {
            world.last_error = Some(err);
            Ok(())
        }
    }
}

#[when("the manager publishes the mission as targeted without a target")]
fn publish_targeted_without_target(world: &mut MissionWorld) -> Result<(), eyre::Report> {
    let mission_id = world.mission_id()?;
    let request = PublishMissionRequest::new(mission_id, PublicationScope::Targeted, None);
    if let Err(err) = run_async(world.service.publish_mission(&world.manager, request)) {
        world.last_error = Some(err);
    }
    world.reload()
}

#[when(r#"instrumentist "{name}" claims the mission"#)]
fn claim_mission(world: &mut MissionWorld, name: String) -> Result<(), eyre::Report> {
    let claimer = world.instrumentist(&name)?;
    let mission_id = world.mission_id()?;
    let result = run_async(world.service.claim_mission(&claimer, mission_id));
    world.record(result);
    Ok(())
}

#[when(r#"instrumentist "{name}" submits the mission"#)]
fn submit_mission(world: &mut MissionWorld, name: String) -> Result<(), eyre::Report> {
    let submitter = world.instrumentist(&name)?;
    let mission_id = world.mission_id()?;
    let result = run_async(
        world
            .service
            .submit_mission(&submitter, mission_id, Submission::default()),
    );
    world.record(result);
    Ok(())
}

#[when("the scheduled start is reached")]
fn scheduled_start_reached(world: &mut MissionWorld) -> Result<(), eyre::Report> {
    let start = scheduled_start(world)?;
    world.clock.set(start);
    Ok(())
}

#[when("the clock is one minute before the scheduled start")]
fn one_minute_before_start(world: &mut MissionWorld) -> Result<(), eyre::Report> {
    let start = scheduled_start(world)?;
    world.clock.set(start - Duration::minutes(1));
    Ok(())
}

fn scheduled_start(world: &MissionWorld) -> Result<chrono::DateTime<chrono::Utc>, eyre::Report> {
    world
        .mission()?
        .schedule()
        .start_at()
        .ok_or_else(|| eyre::eyre!("scenario mission has no scheduled start"))
}
