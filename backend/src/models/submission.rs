// src/models/submission.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// One answer attempt. Represents a row of the 'submissions' table.
/// Append-only: rejected attempts are recorded too.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub team_code: String,
    pub checkpoint_id: i64,
    pub question_id: String,
    pub submitted_answer: String,

    /// Reference returned by the evidence store (e.g. `/uploads/TEAM001_1700000000000.jpg`).
    pub photo_ref: String,
    pub accepted: bool,

    #[sqlx(rename = "created_at")]
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a submission that reached the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub accepted: bool,

    /// The checkpoint the team must visit next, `None` once the route is complete.
    pub next_checkpoint_id: Option<i64>,
    pub route_complete: bool,
}

/// Input to the progress tracker.
#[derive(Debug, Clone)]
pub struct Submission {
    pub team_code: String,

    /// Checkpoint the team claims to be at. Optional; when present it must match.
    pub checkpoint_id: Option<i64>,
    pub question_id: String,
    pub answer: String,
    pub photo_ref: String,
}

/// Text fields of the `submit-answer` multipart form.
#[derive(Debug, Default, Validate)]
pub struct SubmitAnswerForm {
    #[validate(length(min = 1, max = 32, message = "teamCode is required."))]
    pub team_code: String,
    pub checkpoint_id: Option<i64>,
    #[validate(length(min = 1, max = 64, message = "questionId is required."))]
    pub question_id: String,
    #[validate(length(max = 500))]
    pub answer: String,
}

impl SubmitAnswerForm {
    pub fn into_submission(self, photo_ref: String) -> Submission {
        Submission {
            team_code: self.team_code,
            checkpoint_id: self.checkpoint_id,
            question_id: self.question_id,
            answer: self.answer,
            photo_ref,
        }
    }
}
