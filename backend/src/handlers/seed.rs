// src/handlers/seed.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::{error::AppError, seed, state::AppState};

/// Installs the sample teams and checkpoints. Safe to call repeatedly.
pub async fn seed_data(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let summary = seed::seed(state.teams.as_ref(), state.checkpoints.as_ref()).await?;

    Ok(Json(json!({
        "message": "Data seeded successfully",
        "summary": summary,
    })))
}
