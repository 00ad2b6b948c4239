// src/tracker/mod.rs

//! Per-team checkpoint state machine.
//!
//! A team sits at an index into its assigned route. The only transition is
//! an advance by one, caused by an accepted answer for the current
//! checkpoint. Every attempt, accepted or not, is appended to the team's
//! submission log.

pub mod error;

use std::{sync::Arc, time::Duration};

use chrono::Utc;

use crate::{
    models::{
        submission::{Submission, SubmissionRecord, SubmissionResult},
        team::{CheckpointView, Team, TeamProgress},
    },
    store::{CheckpointStore, TeamStore},
    utils::lock::KeyedLocks,
};

use self::error::ProgressError;

pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Case-insensitive, whitespace-trimmed answer comparison.
pub fn answers_match(submitted: &str, expected: &str) -> bool {
    submitted.trim().to_lowercase() == expected.trim().to_lowercase()
}

pub struct ProgressTracker {
    teams: Arc<dyn TeamStore>,
    checkpoints: Arc<dyn CheckpointStore>,
    locks: KeyedLocks,
    submit_timeout: Duration,
}

impl ProgressTracker {
    pub fn new(teams: Arc<dyn TeamStore>, checkpoints: Arc<dyn CheckpointStore>) -> Self {
        Self {
            teams,
            checkpoints,
            locks: KeyedLocks::new(),
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }

    /// Bounds the whole `submit` call, lock wait included.
    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    /// Looks a team up by code. No state change.
    pub async fn login(&self, team_code: &str) -> Result<Team, ProgressError> {
        self.teams
            .get(team_code)
            .await?
            .ok_or_else(|| ProgressError::UnknownTeam(team_code.to_string()))
    }

    /// The team's standing plus the questions of its current checkpoint.
    pub async fn progress(&self, team_code: &str) -> Result<TeamProgress, ProgressError> {
        let team = self.login(team_code).await?;

        let current_checkpoint = match team.current_checkpoint_id() {
            Some(id) => {
                let checkpoint = self
                    .checkpoints
                    .get(id)
                    .await?
                    .ok_or_else(|| missing_checkpoint(&team, id))?;

                Some(CheckpointView {
                    id: checkpoint.id(),
                    location: checkpoint.location().to_string(),
                    questions: checkpoint.public_questions(),
                })
            }
            None => None,
        };

        Ok(TeamProgress {
            team_code: team.team_code().to_string(),
            team_name: team.team_name().to_string(),
            assigned_route: team.assigned_route().to_vec(),
            current_index: team.current_index(),
            route_complete: team.is_complete(),
            current_checkpoint,
        })
    }

    /// The team's audit trail in append order.
    pub async fn submissions(&self, team_code: &str) -> Result<Vec<SubmissionRecord>, ProgressError> {
        Ok(self.login(team_code).await?.submissions().to_vec())
    }

    /// Checks an answer for the team's current checkpoint and records it.
    ///
    /// Submissions for one team are serialized. On timeout nothing is
    /// committed and `StoreUnavailable` is returned.
    pub async fn submit(&self, submission: Submission) -> Result<SubmissionResult, ProgressError> {
        let team_code = submission.team_code.clone();

        match tokio::time::timeout(self.submit_timeout, self.submit_serialized(submission)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "Submission for team {} timed out after {:?}",
                    team_code,
                    self.submit_timeout
                );
                Err(ProgressError::StoreUnavailable(
                    "submission timed out".to_string(),
                ))
            }
        }
    }

    async fn submit_serialized(
        &self,
        submission: Submission,
    ) -> Result<SubmissionResult, ProgressError> {
        let guard = self.locks.lock(&submission.team_code).await;

        let team = self
            .teams
            .get(&submission.team_code)
            .await?
            .ok_or_else(|| ProgressError::UnknownTeam(submission.team_code.clone()))?;

        let current_id = team
            .current_checkpoint_id()
            .ok_or(ProgressError::RouteComplete)?;

        if submission.photo_ref.trim().is_empty() {
            return Err(ProgressError::MissingEvidence);
        }

        if submission.checkpoint_id.is_some_and(|id| id != current_id) {
            return Err(ProgressError::WrongCheckpoint {
                current: current_id,
            });
        }

        let checkpoint = self
            .checkpoints
            .get(current_id)
            .await?
            .ok_or_else(|| missing_checkpoint(&team, current_id))?;

        let question = match checkpoint.question(&submission.question_id) {
            Some(question) => question,
            None => {
                return Err(self
                    .locate_question(&team, current_id, &submission.question_id)
                    .await?);
            }
        };

        let accepted = answers_match(&submission.answer, &question.expected_answer);

        let record = SubmissionRecord {
            team_code: team.team_code().to_string(),
            checkpoint_id: current_id,
            question_id: submission.question_id,
            submitted_answer: submission.answer,
            photo_ref: submission.photo_ref,
            accepted,
            timestamp: Utc::now(),
        };

        // Re-check the observed position inside the atomic update in case
        // another writer got to the store first.
        let observed_index = team.current_index();
        let updated = self
            .teams
            .update(
                team.team_code(),
                Box::new(move |team: &mut Team| {
                    if team.current_index() != observed_index {
                        return Err(match team.current_checkpoint_id() {
                            Some(current) => ProgressError::WrongCheckpoint { current },
                            None => ProgressError::RouteComplete,
                        });
                    }
                    team.record_attempt(record)
                }),
            )
            .await?;

        drop(guard);

        if accepted {
            tracing::info!(
                "Team {} cleared checkpoint {} ({}/{})",
                updated.team_code(),
                current_id,
                updated.current_index(),
                updated.assigned_route().len()
            );
        } else {
            tracing::info!(
                "Team {} gave a wrong answer at checkpoint {}",
                updated.team_code(),
                current_id
            );
        }

        Ok(SubmissionResult {
            accepted,
            next_checkpoint_id: updated.current_checkpoint_id(),
            route_complete: updated.is_complete(),
        })
    }

    /// Explains why a question is not answerable at the current checkpoint.
    async fn locate_question(
        &self,
        team: &Team,
        current_id: i64,
        question_id: &str,
    ) -> Result<ProgressError, ProgressError> {
        for &id in team.assigned_route() {
            if id == current_id {
                continue;
            }
            if let Some(checkpoint) = self.checkpoints.get(id).await? {
                if checkpoint.question(question_id).is_some() {
                    return Ok(ProgressError::WrongCheckpoint {
                        current: current_id,
                    });
                }
            }
        }

        Ok(ProgressError::UnknownQuestion(question_id.to_string()))
    }
}

fn missing_checkpoint(team: &Team, checkpoint_id: i64) -> ProgressError {
    tracing::error!(
        "Route of team {} references missing checkpoint {}",
        team.team_code(),
        checkpoint_id
    );
    ProgressError::InvalidRecord(format!("checkpoint {} does not exist", checkpoint_id))
}
