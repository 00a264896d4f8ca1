//! In-memory mission repository.
//!
//! Each mission lives behind its own mutex, which plays the role of the row
//! lock held by the `PostgreSQL` adapter. Every state change re-reads the
//! mission while holding it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, Mutex, RwLock};

use crate::mission::{
    domain::{
        Mission, MissionClaim, MissionDomainError, MissionId, MissionPublication, MissionStatus,
        UserId,
    },
    ports::{MissionRepository, MissionRepositoryError, MissionRepositoryResult},
};

/// Thread-safe in-memory mission repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMissionRepository {
    state: Arc<RwLock<InMemoryMissionState>>,
}

#[derive(Debug, Default)]
struct InMemoryMissionState {
    missions: HashMap<MissionId, Arc<Mutex<MissionEntry>>>,
}

#[derive(Debug)]
struct MissionEntry {
    mission: Mission,
    claim: Option<MissionClaim>,
    publications: Vec<MissionPublication>,
}

impl InMemoryMissionRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, id: MissionId) -> MissionRepositoryResult<Arc<Mutex<MissionEntry>>> {
        let state = self.state.read().map_err(poisoned)?;
        state
            .missions
            .get(&id)
            .cloned()
            .ok_or(MissionRepositoryError::NotFound(id))
    }

    fn entries(&self) -> MissionRepositoryResult<Vec<Arc<Mutex<MissionEntry>>>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.missions.values().cloned().collect())
    }
}

fn poisoned(err: impl Display) -> MissionRepositoryError {
    MissionRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl MissionRepository for InMemoryMissionRepository {
    async fn store(&self, mission: &Mission) -> MissionRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.missions.contains_key(&mission.id()) {
            return Err(MissionRepositoryError::DuplicateMission(mission.id()));
        }
        let entry = MissionEntry {
            mission: mission.clone(),
            claim: None,
            publications: Vec::new(),
        };
        state
            .missions
            .insert(mission.id(), Arc::new(Mutex::new(entry)));
        Ok(())
    }

    async fn find_by_id(&self, id: MissionId) -> MissionRepositoryResult<Option<Mission>> {
        let state = self.state.read().map_err(poisoned)?;
        let Some(entry) = state.missions.get(&id) else {
            return Ok(None);
        };
        let guard = entry.lock().map_err(poisoned)?;
        Ok(Some(guard.mission.clone()))
    }

    async fn apply<F, T>(
        &self,
        mission_id: MissionId,
        change: F,
    ) -> MissionRepositoryResult<(Mission, T)>
    where
        F: FnOnce(&mut Mission) -> Result<T, MissionDomainError> + Send + 'static,
        T: Send + 'static,
    {
        let entry = self.entry(mission_id)?;
        let mut guard = entry.lock().map_err(poisoned)?;

        let mut mission = guard.mission.clone();
        let outcome = change(&mut mission)?;
        guard.mission = mission.clone();
        Ok((mission, outcome))
    }

    async fn publish<F>(
        &self,
        mission_id: MissionId,
        publish: F,
    ) -> MissionRepositoryResult<(Mission, MissionPublication)>
    where
        F: FnOnce(&mut Mission) -> Result<MissionPublication, MissionDomainError>
            + Send
            + 'static,
    {
        let entry = self.entry(mission_id)?;
        let mut guard = entry.lock().map_err(poisoned)?;

        let mut mission = guard.mission.clone();
        let publication = publish(&mut mission)?;
        guard.mission = mission.clone();
        guard.publications.push(publication.clone());
        Ok((mission, publication))
    }

    async fn claim(
        &self,
        mission_id: MissionId,
        instrumentist_id: UserId,
        claimed_at: DateTime<Utc>,
    ) -> MissionRepositoryResult<(Mission, MissionClaim)> {
        let entry = self.entry(mission_id)?;
        let mut guard = entry.lock().map_err(poisoned)?;

        let mut mission = guard.mission.clone();
        let claim = mission.claim(instrumentist_id, claimed_at)?;
        if guard.claim.is_some() {
            return Err(MissionRepositoryError::DuplicateClaim(mission_id));
        }

        guard.mission = mission.clone();
        guard.claim = Some(claim);
        Ok((mission, claim))
    }

    async fn find_claim(
        &self,
        mission_id: MissionId,
    ) -> MissionRepositoryResult<Option<MissionClaim>> {
        let entry = self.entry(mission_id)?;
        let guard = entry.lock().map_err(poisoned)?;
        Ok(guard.claim)
    }

    async fn list_publications(
        &self,
        mission_id: MissionId,
    ) -> MissionRepositoryResult<Vec<MissionPublication>> {
        let entry = self.entry(mission_id)?;
        let guard = entry.lock().map_err(poisoned)?;
        Ok(guard.publications.clone())
    }

    async fn list_open_published(
        &self,
    ) -> MissionRepositoryResult<Vec<(Mission, Vec<MissionPublication>)>> {
        let mut open = Vec::new();
        for entry in self.entries()? {
            let guard = entry.lock().map_err(poisoned)?;
            if guard.mission.status() == MissionStatus::Open && !guard.publications.is_empty() {
                open.push((guard.mission.clone(), guard.publications.clone()));
            }
        }
        Ok(open)
    }
}
