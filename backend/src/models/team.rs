// src/models/team.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    models::{checkpoint::PublicQuestion, submission::SubmissionRecord},
    tracker::error::ProgressError,
};

pub const MAX_TEAM_CODE_LEN: usize = 32;

/// A team and its position on its assigned route.
///
/// `current_index` ranges over `0..=assigned_route.len()`; the upper bound
/// means the route is complete. The only way to move it is an accepted
/// [`SubmissionRecord`] passed to `record_attempt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    team_code: String,
    team_name: String,
    assigned_route: Vec<i64>,
    current_index: usize,
    submissions: Vec<SubmissionRecord>,
}

impl Team {
    /// Creates a team at the start of its route.
    pub fn new(
        team_code: impl Into<String>,
        team_name: impl Into<String>,
        assigned_route: Vec<i64>,
    ) -> Result<Self, ProgressError> {
        Self::restore(team_code, team_name, assigned_route, 0, Vec::new())
    }

    /// Rebuilds a team from persisted state, checking the index invariant.
    pub(crate) fn restore(
        team_code: impl Into<String>,
        team_name: impl Into<String>,
        assigned_route: Vec<i64>,
        current_index: usize,
        submissions: Vec<SubmissionRecord>,
    ) -> Result<Self, ProgressError> {
        let team_code = team_code.into();
        let team_name = team_name.into();

        if team_code.trim().is_empty() || team_code.len() > MAX_TEAM_CODE_LEN {
            return Err(ProgressError::InvalidRecord(format!(
                "team code must be 1 to {MAX_TEAM_CODE_LEN} characters"
            )));
        }
        if team_name.trim().is_empty() {
            return Err(ProgressError::InvalidRecord(format!(
                "team '{team_code}' has no name"
            )));
        }
        if assigned_route.is_empty() {
            return Err(ProgressError::InvalidRecord(format!(
                "team '{team_code}' has an empty route"
            )));
        }
        if current_index > assigned_route.len() {
            return Err(ProgressError::InvalidRecord(format!(
                "team '{team_code}' is at index {current_index} of a {}-checkpoint route",
                assigned_route.len()
            )));
        }

        Ok(Self {
            team_code,
            team_name,
            assigned_route,
            current_index,
            submissions,
        })
    }

    pub fn team_code(&self) -> &str {
        &self.team_code
    }

    pub fn team_name(&self) -> &str {
        &self.team_name
    }

    pub fn assigned_route(&self) -> &[i64] {
        &self.assigned_route
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn submissions(&self) -> &[SubmissionRecord] {
        &self.submissions
    }

    pub fn is_complete(&self) -> bool {
        self.current_index == self.assigned_route.len()
    }

    /// The only checkpoint the team may currently submit for.
    pub fn current_checkpoint_id(&self) -> Option<i64> {
        self.assigned_route.get(self.current_index).copied()
    }

    /// Appends an attempt to the audit trail and advances on acceptance.
    pub(crate) fn record_attempt(&mut self, record: SubmissionRecord) -> Result<(), ProgressError> {
        let current = self
            .current_checkpoint_id()
            .ok_or(ProgressError::RouteComplete)?;

        if record.checkpoint_id != current {
            return Err(ProgressError::WrongCheckpoint { current });
        }

        let accepted = record.accepted;
        self.submissions.push(record);
        if accepted {
            self.current_index += 1;
        }
        Ok(())
    }
}

/// Public view of a team's standing on its route.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamProgress {
    pub team_code: String,
    pub team_name: String,
    pub assigned_route: Vec<i64>,
    pub current_index: usize,
    pub route_complete: bool,
    pub current_checkpoint: Option<CheckpointView>,
}

/// The current checkpoint as shown to a team.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointView {
    pub id: i64,
    pub location: String,
    pub questions: Vec<PublicQuestion>,
}

/// DTO for team login.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 32, message = "teamCode must be 1 to 32 characters."))]
    pub team_code: String,
}
