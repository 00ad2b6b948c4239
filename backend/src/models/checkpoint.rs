// src/models/checkpoint.rs

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::tracker::error::ProgressError;

/// A question asked at a checkpoint.
/// Stored as part of the checkpoint's `questions` JSON column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,

    /// Never sent to clients, see [`PublicQuestion`].
    pub expected_answer: String,
}

impl Question {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        expected_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            expected_answer: expected_answer.into(),
        }
    }
}

/// DTO for sending a question to a team (excludes the expected answer).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: String,
    pub text: String,
}

/// A physical location with one or more questions. Immutable after seeding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    id: i64,
    location: String,
    questions: Vec<Question>,
}

impl Checkpoint {
    /// Builds a checkpoint, rejecting anything that could not be answered.
    pub fn new(
        id: i64,
        location: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, ProgressError> {
        let location = location.into();

        if location.trim().is_empty() {
            return Err(ProgressError::InvalidRecord(format!(
                "checkpoint {id} has no location"
            )));
        }

        if questions.is_empty() {
            return Err(ProgressError::InvalidRecord(format!(
                "checkpoint {id} has no questions"
            )));
        }

        let mut seen = HashSet::new();
        for question in &questions {
            if question.id.trim().is_empty() || question.expected_answer.trim().is_empty() {
                return Err(ProgressError::InvalidRecord(format!(
                    "checkpoint {id} has a question without an id or answer"
                )));
            }
            if !seen.insert(question.id.as_str()) {
                return Err(ProgressError::InvalidRecord(format!(
                    "checkpoint {id} repeats question '{}'",
                    question.id
                )));
            }
        }

        Ok(Self {
            id,
            location,
            questions,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn public_questions(&self) -> Vec<PublicQuestion> {
        self.questions
            .iter()
            .map(|q| PublicQuestion {
                id: q.id.clone(),
                text: q.text.clone(),
            })
            .collect()
    }
}
