// src/handlers/teams.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError, models::team::LoginRequest, tracker::ProgressTracker,
    tracker::error::ProgressError,
};

/// Logs a team in by code.
///
/// Pure lookup: returns the team with its route and position, or 404.
pub async fn login(
    State(tracker): State<Arc<ProgressTracker>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let team = tracker
        .login(payload.team_code.trim())
        .await
        .map_err(|e| match e {
            ProgressError::UnknownTeam(_) => AppError::NotFound("Invalid team code".to_string()),
            other => AppError::from(other),
        })?;

    tracing::info!("Team {} logged in", team.team_code());

    Ok(Json(json!({
        "success": true,
        "data": team,
    })))
}

/// Returns the team's position and the questions of its current checkpoint.
pub async fn progress(
    State(tracker): State<Arc<ProgressTracker>>,
    Path(team_code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let progress = tracker.progress(&team_code).await?;
    Ok(Json(progress))
}

/// Returns every attempt the team has made, oldest first.
pub async fn submissions(
    State(tracker): State<Arc<ProgressTracker>>,
    Path(team_code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let submissions = tracker.submissions(&team_code).await?;
    Ok(Json(submissions))
}
