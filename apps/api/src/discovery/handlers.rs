use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::discovery::DiscoveryResult;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FindEmailRequest {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub person_name: String,
}

/// POST /api/v1/email/find
///
/// Both fields are required here. A miss returns `{email: null, source: null}`.
pub async fn handle_find_email(
    State(state): State<AppState>,
    Json(req): Json<FindEmailRequest>,
) -> Result<Json<DiscoveryResult>, AppError> {
    if req.company_name.trim().is_empty() || req.person_name.trim().is_empty() {
        return Err(AppError::Validation(
            "Please enter both company name and person name.".to_string(),
        ));
    }

    let credentials = state.settings.read().await.discovery.clone();
    let outcome = state
        .email_finder(&credentials)
        .find(&req.company_name, Some(&req.person_name))
        .await?;

    if let Some(email) = outcome.email() {
        info!("Email found for {}: {email}", req.person_name.trim());
    }
    Ok(Json(outcome.into()))
}
