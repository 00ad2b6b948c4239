// src/handlers/submission.rs

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::submission::SubmitAnswerForm,
    store::{EvidenceMetadata, EvidenceStore},
    tracker::ProgressTracker,
};

/// The `photo` part of the form.
struct PhotoUpload {
    file_name: Option<String>,
    data: Bytes,
}

/// Reads the multipart form into its text fields and the optional photo.
async fn read_form(
    mut multipart: Multipart,
) -> Result<(SubmitAnswerForm, Option<PhotoUpload>), AppError> {
    let mut form = SubmitAnswerForm::default();
    let mut photo = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "teamCode" => form.team_code = field.text().await?.trim().to_string(),
            "questionId" => form.question_id = field.text().await?.trim().to_string(),
            "answer" => form.answer = field.text().await?,
            "checkpointId" => {
                let raw = field.text().await?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    let id = raw.parse::<i64>().map_err(|_| {
                        AppError::BadRequest(format!("Invalid checkpointId '{}'", raw))
                    })?;
                    form.checkpoint_id = Some(id);
                }
            }
            "photo" => {
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await?;
                photo = Some(PhotoUpload {
                    file_name,
                    data,
                });
            }
            other => tracing::debug!("Ignoring unexpected form field '{}'", other),
        }
    }

    Ok((form, photo))
}

/// Submits an answer with photo evidence for the team's current checkpoint.
///
/// * Stores the photo, then hands its reference to the progress tracker.
/// * Wrong answers are recorded and return `accepted: false` with 200.
/// * If the tracker refuses the submission outright, the photo is discarded.
///   On `StoreUnavailable` it is kept, since the outcome is unknown.
pub async fn submit_answer(
    State(tracker): State<Arc<ProgressTracker>>,
    State(evidence): State<Arc<dyn EvidenceStore>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (form, photo) = read_form(multipart).await?;

    if let Err(validation_errors) = form.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let photo_ref = match photo {
        Some(photo) if !photo.data.is_empty() => {
            let metadata = EvidenceMetadata {
                team_code: form.team_code.clone(),
                file_name: photo.file_name,
            };
            evidence.put(&photo.data, &metadata).await?
        }
        // An empty reference makes the tracker report `MissingEvidence`
        // after it has checked the team itself.
        _ => String::new(),
    };

    match tracker.submit(form.into_submission(photo_ref.clone())).await {
        Ok(result) => Ok(Json(json!({
            "success": true,
            "data": result,
        }))),
        Err(err) => {
            // After a store failure the attempt may already reference the photo.
            if err.is_client_error() && !photo_ref.is_empty() {
                if let Err(discard_err) = evidence.discard(&photo_ref).await {
                    tracing::warn!("Failed to discard photo {}: {}", photo_ref, discard_err);
                }
            }
            Err(err.into())
        }
    }
}
