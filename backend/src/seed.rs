// src/seed.rs

//! Sample event data installed by `GET /api/seed` or `SEED_ON_STARTUP`.

use serde::Serialize;

use crate::{
    models::{
        checkpoint::{Checkpoint, Question},
        team::Team,
    },
    store::{CheckpointStore, TeamStore},
    tracker::error::ProgressError,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub teams_created: usize,
    pub checkpoints_created: usize,
}

pub fn sample_teams() -> Result<Vec<Team>, ProgressError> {
    Ok(vec![
        Team::new("TEAM001", "Adventure Seekers", vec![1, 2, 3])?,
        Team::new("TEAM002", "Code Breakers", vec![2, 3, 1])?,
    ])
}

pub fn sample_checkpoints() -> Result<Vec<Checkpoint>, ProgressError> {
    Ok(vec![
        Checkpoint::new(
            1,
            "Library",
            vec![Question::new("q1", "What year was this built?", "1925")],
        )?,
        Checkpoint::new(
            2,
            "Clock Tower",
            vec![Question::new("q2", "How many faces does the clock have?", "4")],
        )?,
        Checkpoint::new(
            3,
            "Fountain",
            vec![Question::new("q3", "Which animal is carved on the fountain?", "Lion")],
        )?,
    ])
}

/// Inserts the sample data. Existing teams and checkpoints are left alone,
/// so seeding twice is harmless.
pub async fn seed(
    teams: &dyn TeamStore,
    checkpoints: &dyn CheckpointStore,
) -> Result<SeedSummary, ProgressError> {
    let mut summary = SeedSummary::default();

    for checkpoint in sample_checkpoints()? {
        if checkpoints.insert(checkpoint).await? {
            summary.checkpoints_created += 1;
        }
    }

    for team in sample_teams()? {
        if teams.insert(team).await? {
            summary.teams_created += 1;
        }
    }

    tracing::info!(
        "Seeded {} teams and {} checkpoints",
        summary.teams_created,
        summary.checkpoints_created
    );

    Ok(summary)
}
