// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    models::{checkpoint::Checkpoint, team::Team},
    store::{CheckpointStore, TeamMutator, TeamStore},
    tracker::error::ProgressError,
};

/// In-process team store. Used by tests and when no `DATABASE_URL` is set.
#[derive(Debug, Default)]
pub struct MemoryTeamStore {
    teams: RwLock<HashMap<String, Team>>,
}

impl MemoryTeamStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeamStore for MemoryTeamStore {
    async fn get(&self, team_code: &str) -> Result<Option<Team>, ProgressError> {
        Ok(self.teams.read().await.get(team_code).cloned())
    }

    async fn update(
        &self,
        team_code: &str,
        mutator: TeamMutator<'_>,
    ) -> Result<Team, ProgressError> {
        let mut teams = self.teams.write().await;
        let stored = teams
            .get_mut(team_code)
            .ok_or_else(|| ProgressError::UnknownTeam(team_code.to_string()))?;

        // Mutate a copy so a failing mutator leaves the stored team untouched.
        let mut next = stored.clone();
        mutator(&mut next)?;
        *stored = next.clone();

        Ok(next)
    }

    async fn insert(&self, team: Team) -> Result<bool, ProgressError> {
        let mut teams = self.teams.write().await;
        if teams.contains_key(team.team_code()) {
            return Ok(false);
        }
        teams.insert(team.team_code().to_string(), team);
        Ok(true)
    }
}

/// In-process checkpoint store.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    checkpoints: RwLock<HashMap<i64, Checkpoint>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn get(&self, checkpoint_id: i64) -> Result<Option<Checkpoint>, ProgressError> {
        Ok(self.checkpoints.read().await.get(&checkpoint_id).cloned())
    }

    async fn insert(&self, checkpoint: Checkpoint) -> Result<bool, ProgressError> {
        let mut checkpoints = self.checkpoints.write().await;
        if checkpoints.contains_key(&checkpoint.id()) {
            return Ok(false);
        }
        checkpoints.insert(checkpoint.id(), checkpoint);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_is_first_writer_wins() {
        let store = MemoryTeamStore::new();
        let first = Team::new("TEAM001", "Adventure Seekers", vec![1]).unwrap();
        let second = Team::new("TEAM001", "Impostors", vec![2]).unwrap();

        assert!(store.insert(first).await.unwrap());
        assert!(!store.insert(second).await.unwrap());

        let stored = store.get("TEAM001").await.unwrap().unwrap();
        assert_eq!(stored.team_name(), "Adventure Seekers");
    }

    #[tokio::test]
    async fn test_failed_mutator_leaves_team_unchanged() {
        let store = MemoryTeamStore::new();
        let team = Team::new("TEAM001", "Adventure Seekers", vec![1]).unwrap();
        store.insert(team.clone()).await.unwrap();

        let result = store
            .update(
                "TEAM001",
                Box::new(|_team: &mut Team| -> Result<(), ProgressError> {
                    Err(ProgressError::RouteComplete)
                }),
            )
            .await;

        assert_eq!(result.unwrap_err(), ProgressError::RouteComplete);
        assert_eq!(store.get("TEAM001").await.unwrap(), Some(team));
    }

    #[tokio::test]
    async fn test_update_unknown_team() {
        let store = MemoryTeamStore::new();
        let result = store
            .update(
                "NOPE",
                Box::new(|_team: &mut Team| -> Result<(), ProgressError> { Ok(()) }),
            )
            .await;
        assert_eq!(
            result.unwrap_err(),
            ProgressError::UnknownTeam("NOPE".to_string())
        );
    }
}
