// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    store::{
        CheckpointStore, EvidenceStore, TeamStore,
        evidence::FsEvidenceStore,
        memory::{MemoryCheckpointStore, MemoryTeamStore},
    },
    tracker::ProgressTracker,
};

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<ProgressTracker>,
    pub teams: Arc<dyn TeamStore>,
    pub checkpoints: Arc<dyn CheckpointStore>,
    pub evidence: Arc<dyn EvidenceStore>,
    pub config: Config,
}

impl AppState {
    /// Wires the tracker to the given stores.
    pub fn new(
        config: Config,
        teams: Arc<dyn TeamStore>,
        checkpoints: Arc<dyn CheckpointStore>,
        evidence: Arc<dyn EvidenceStore>,
    ) -> Self {
        let tracker = ProgressTracker::new(teams.clone(), checkpoints.clone())
            .with_submit_timeout(config.submit_timeout());

        Self {
            tracker: Arc::new(tracker),
            teams,
            checkpoints,
            evidence,
            config,
        }
    }

    /// In-memory records with photos written to `config.upload_dir`.
    pub fn in_memory(config: Config) -> Self {
        let evidence = FsEvidenceStore::new(config.upload_dir.clone(), config.max_upload_bytes);

        Self::new(
            config,
            Arc::new(MemoryTeamStore::new()),
            Arc::new(MemoryCheckpointStore::new()),
            Arc::new(evidence),
        )
    }
}

impl FromRef<AppState> for Arc<ProgressTracker> {
    fn from_ref(state: &AppState) -> Self {
        state.tracker.clone()
    }
}

impl FromRef<AppState> for Arc<dyn EvidenceStore> {
    fn from_ref(state: &AppState) -> Self {
        state.evidence.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
