//! Axum route handlers for the Applications API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::applications::models::{ApplicationRecord, JobPosting};
use crate::applications::service::{
    generate_application, send_application, SendContext, SendOutcome,
};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SendRequest {
    /// Storage name returned by the upload endpoint.
    pub resume_file_name: Option<String>,
}

/// GET /api/v1/applications
///
/// Most recent first.
pub async fn handle_list_applications(
    State(state): State<AppState>,
) -> Json<Vec<ApplicationRecord>> {
    Json(state.pipeline.read().await.list().to_vec())
}

/// POST /api/v1/applications
///
/// Generates the personalized sentence and email for a job and records it.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(job): Json<JobPosting>,
) -> Result<(StatusCode, Json<ApplicationRecord>), AppError> {
    let settings = state.settings.read().await.clone();
    let record =
        generate_application(&state.pipeline, state.sentences.as_ref(), &settings, job).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/v1/applications/:id
///
/// Idempotent: deleting an unknown id also returns 204.
pub async fn handle_delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    state.pipeline.write().await.remove(id);
    StatusCode::NO_CONTENT
}

/// POST /api/v1/applications/:id/send
///
/// Body is optional. A discovery miss is a 200 with `outcome: "not_found"`.
pub async fn handle_send(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<SendRequest>>,
) -> Result<Json<SendOutcome>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let settings = state.settings.read().await.clone();
    let finder = state.email_finder(&settings.discovery);

    let ctx = SendContext {
        pipeline: &state.pipeline,
        finder: &finder,
        mailer: state.mailer.as_ref(),
        files: state.files.as_ref(),
    };

    let outcome =
        send_application(&ctx, &settings, id, request.resume_file_name.as_deref()).await?;
    Ok(Json(outcome))
}
