// src/tracker/error.rs

use std::fmt;

/// Errors produced by the progress tracker and the stores behind it.
///
/// Everything except `StoreUnavailable` is a client-input error and must not
/// be retried as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressError {
    UnknownTeam(String),

    UnknownQuestion(String),

    /// The submission targets a checkpoint other than the team's current one.
    WrongCheckpoint { current: i64 },

    RouteComplete,

    MissingEvidence,

    /// A record failed validated construction.
    InvalidRecord(String),

    /// Uploaded evidence exceeds the configured limit (in bytes).
    PayloadTooLarge(usize),

    /// Transient store failure or timeout. Safe to retry.
    StoreUnavailable(String),
}

impl fmt::Display for ProgressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressError::UnknownTeam(code) => write!(f, "Unknown team '{}'", code),
            ProgressError::UnknownQuestion(id) => write!(f, "Unknown question '{}'", id),
            ProgressError::WrongCheckpoint { current } => write!(
                f,
                "Submission does not match the current checkpoint ({})",
                current
            ),
            ProgressError::RouteComplete => write!(f, "Route already complete"),
            ProgressError::MissingEvidence => write!(f, "A photo is required"),
            ProgressError::InvalidRecord(reason) => write!(f, "Invalid record: {}", reason),
            ProgressError::PayloadTooLarge(limit) => {
                write!(f, "Photo exceeds the {} byte limit", limit)
            }
            ProgressError::StoreUnavailable(reason) => {
                write!(f, "Store unavailable: {}", reason)
            }
        }
    }
}

impl ProgressError {
    /// Whether the request itself was refused. Such errors never leave
    /// anything behind in the stores.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ProgressError::StoreUnavailable(_))
    }
}

impl std::error::Error for ProgressError {}
