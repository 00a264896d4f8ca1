//! Shared world state for mission lifecycle BDD scenarios.

use crate::test_helpers::{FixedClock, monday_morning};
use rstest::fixture;
use staffline::mission::{
    adapters::memory::{
        InMemoryMembershipRepository, InMemoryMissionRepository, InMemoryUserDirectory,
    },
    domain::{Actor, Mission, MissionId, Role, SiteId, UserId},
    services::{MissionLifecycleService, MissionServiceError},
};
use std::collections::HashMap;
use std::sync::Arc;

/// Service type used by the BDD world.
pub type TestMissionService = MissionLifecycleService<
    InMemoryMissionRepository,
    InMemoryMembershipRepository,
    InMemoryUserDirectory,
    FixedClock,
>;

/// Scenario world for mission lifecycle behaviour tests.
pub struct MissionWorld {
    pub service: TestMissionService,
    pub directory: Arc<InMemoryUserDirectory>,
    pub clock: Arc<FixedClock>,
    pub manager: Actor,
    pub surgeon: Actor,
    pub site_id: SiteId,
    pub mission: Option<Mission>,
    pub instrumentists: HashMap<String, Actor>,
    pub last_error: Option<MissionServiceError>,
}

impl MissionWorld {
    /// Creates a world with the clock at 08:00 and no users registered.
    #[must_use]
    pub fn new() -> Self {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let clock = Arc::new(FixedClock::at(monday_morning()));
        let service = MissionLifecycleService::new(
            Arc::new(InMemoryMissionRepository::new()),
            Arc::new(InMemoryMembershipRepository::new()),
            Arc::clone(&directory),
            Arc::clone(&clock),
        );

        Self {
            service,
            directory,
            clock,
            manager: Actor::new(UserId::new(), Role::Manager),
            surgeon: Actor::new(UserId::new(), Role::Surgeon),
            site_id: SiteId::new(),
            mission: None,
            instrumentists: HashMap::new(),
            last_error: None,
        }
    }

    /// Returns the named instrumentist, registering them on first use.
    pub fn instrumentist(&mut self, name: &str) -> Result<Actor, eyre::Report> {
        if let Some(actor) = self.instrumentists.get(name) {
            return Ok(*actor);
        }
        let actor = Actor::new(UserId::new(), Role::Instrumentist);
        self.directory.insert(actor)?;
        self.instrumentists.insert(name.to_owned(), actor);
        Ok(actor)
    }

    /// Returns the scenario mission.
    pub fn mission(&self) -> Result<&Mission, eyre::Report> {
        self.mission
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing mission in scenario world"))
    }

    /// Returns the scenario mission identifier.
    pub fn mission_id(&self) -> Result<MissionId, eyre::Report> {
        self.mission().map(Mission::id)
    }

    /// Records the outcome of a mission-returning operation.
    pub fn record(&mut self, result: Result<Mission, MissionServiceError>) {
        match result {
            Ok(mission) => {
                self.mission = Some(mission);
                self.last_error = None;
            }
            Err(err) => self.last_error = Some(err),
        }
    }

    /// Reloads the scenario mission from the repository.
    pub fn reload(&mut self) -> Result<(), eyre::Report> {
        let mission_id = self.mission_id()?;
        let reloaded = run_async(self.service.find_by_id(mission_id))?
            .ok_or_else(|| eyre::eyre!("mission {mission_id} disappeared"))?;
        self.mission = Some(reloaded);
        Ok(())
    }
}

impl Default for MissionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> MissionWorld {
    MissionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
