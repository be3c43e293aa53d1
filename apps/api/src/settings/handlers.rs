use axum::{extract::State, Json};
use tracing::info;

use crate::settings::{SettingsView, UserSettings};
use crate::state::AppState;

/// GET /api/v1/settings
pub async fn handle_get_settings(State(state): State<AppState>) -> Json<SettingsView> {
    let settings = state.settings.read().await;
    Json(SettingsView::from(&*settings))
}

/// PUT /api/v1/settings
///
/// Replaces the profile. Secrets omitted from the body keep their stored value.
pub async fn handle_put_settings(
    State(state): State<AppState>,
    Json(mut new_settings): Json<UserSettings>,
) -> Json<SettingsView> {
    let mut settings = state.settings.write().await;
    new_settings.keep_secrets_from(&settings);
    let view = SettingsView::from(&new_settings);
    *settings = new_settings;
    info!("User settings updated");
    Json(view)
}
