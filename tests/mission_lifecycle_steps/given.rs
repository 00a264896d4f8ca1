//! Given steps for mission lifecycle BDD scenarios.

use super::world::{MissionWorld, run_async};
use crate::test_helpers::monday_morning;
use chrono::Duration;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use staffline::mission::services::{CreateMissionRequest, PublishMissionRequest};

#[given("a manager at a hospital site")]
fn manager_at_site(world: &mut MissionWorld) -> Result<(), eyre::Report> {
    world.directory.insert(world.manager)?;
    world.directory.insert(world.surgeon)?;
    Ok(())
}

#[given("a draft mission scheduled one hour from now")]
fn draft_mission(world: &mut MissionWorld) -> Result<(), eyre::Report> {
    let start = monday_morning() + Duration::hours(1);
    let request = CreateMissionRequest::new(world.site_id, world.surgeon.id())
        .with_schedule(start, start + Duration::hours(4));
    let mission = run_async(world.service.create_draft(&world.manager, request))
        .wrap_err("create draft mission for scenario")?;
    world.mission = Some(mission);
    Ok(())
}

#[given("the mission has been published to the pool")]
fn mission_published(world: &mut MissionWorld) -> Result<(), eyre::Report> {
    let mission_id = world.mission_id()?;
    run_async(
        world
            .service
            .publish_mission(&world.manager, PublishMissionRequest::pool(mission_id)),
    )
    .wrap_err("publish mission in scenario setup")?;
    world.reload()
}

#[given(r#"instrumentist "{name}" has claimed the mission"#)]
fn mission_claimed(world: &mut MissionWorld, name: String) -> Result<(), eyre::Report> {
    let claimer = world.instrumentist(&name)?;
    let mission_id = world.mission_id()?;
    let claimed = run_async(world.service.claim_mission(&claimer, mission_id))
        .wrap_err("claim mission in scenario setup")?;
    world.mission = Some(claimed);
    Ok(())
}
