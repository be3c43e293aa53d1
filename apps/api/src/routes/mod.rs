pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::applications::handlers as applications;
use crate::auth::handlers as auth;
use crate::discovery::handlers as discovery;
use crate::settings::handlers as settings;
use crate::state::AppState;
use crate::storage::handlers as storage;
use crate::storage::upload::MAX_UPLOAD_BYTES;

/// Headroom over the file cap so oversized uploads get the friendly error.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES * 2;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/settings",
            get(settings::handle_get_settings).put(settings::handle_put_settings),
        )
        // Applications
        .route(
            "/api/v1/applications",
            get(applications::handle_list_applications).post(applications::handle_generate),
        )
        .route("/api/v1/applications/:id", delete(applications::handle_delete))
        .route("/api/v1/applications/:id/send", post(applications::handle_send))
        // Email discovery
        .route("/api/v1/email/find", post(discovery::handle_find_email))
        // Resume storage
        .route(
            "/api/v1/uploads",
            post(storage::handle_upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/v1/uploads/check", get(storage::handle_check_upload))
        .route("/api/v1/storage/status", get(storage::handle_storage_status))
        // Accounts
        .route("/api/v1/auth/signup", post(auth::handle_signup))
        .with_state(state)
}
