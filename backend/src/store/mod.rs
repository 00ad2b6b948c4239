// src/store/mod.rs

//! Persistence seams consumed by the progress tracker.

pub mod evidence;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    models::{checkpoint::Checkpoint, team::Team},
    tracker::error::ProgressError,
};

/// Read-modify-write step applied by [`TeamStore::update`].
/// Returning an error aborts the update without writing anything.
pub type TeamMutator<'a> = Box<dyn FnOnce(&mut Team) -> Result<(), ProgressError> + Send + 'a>;

/// Teams keyed by team code.
#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn get(&self, team_code: &str) -> Result<Option<Team>, ProgressError>;

    /// Atomically applies `mutator` to the stored team and returns the new state.
    /// Fails with `UnknownTeam` if no such team exists.
    async fn update(&self, team_code: &str, mutator: TeamMutator<'_>)
    -> Result<Team, ProgressError>;

    /// Inserts a team unless its code is taken. Returns whether it was inserted.
    async fn insert(&self, team: Team) -> Result<bool, ProgressError>;
}

/// Checkpoints keyed by id. Read-only once the event is running.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn get(&self, checkpoint_id: i64) -> Result<Option<Checkpoint>, ProgressError>;

    /// Inserts a checkpoint unless its id is taken. Returns whether it was inserted.
    async fn insert(&self, checkpoint: Checkpoint) -> Result<bool, ProgressError>;
}

/// Describes an uploaded photo.
#[derive(Debug, Clone, Default)]
pub struct EvidenceMetadata {
    pub team_code: String,
    pub file_name: Option<String>,
}

/// Photo persistence. Returns opaque references; contents are never inspected.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    async fn put(&self, bytes: &[u8], metadata: &EvidenceMetadata)
    -> Result<String, ProgressError>;

    /// Removes a photo whose submission was never recorded.
    async fn discard(&self, photo_ref: &str) -> Result<(), ProgressError>;
}
