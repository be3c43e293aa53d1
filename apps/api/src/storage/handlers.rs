//! Axum route handlers for resume uploads and storage status.

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;
use crate::storage::upload::{stored_file_name, validate_upload};
use crate::storage::StoredFile;

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub file_name: String,
    pub original_name: String,
    pub file_size: u64,
}

#[derive(Debug, Deserialize)]
pub struct FileCheckQuery {
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileCheckResponse {
    pub exists: bool,
    pub file_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoredFileEntry {
    pub file_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StorageStatusResponse {
    pub success: bool,
    pub file_count: usize,
    pub files: Vec<StoredFileEntry>,
}

/// POST /api/v1/uploads
///
/// Multipart body with a `file` part. Returns the generated storage name,
/// which is what a send request references as its resume.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        validate_upload(&original_name, &mime_type, bytes.len())?;

        let file_name = stored_file_name(&original_name, Utc::now());
        let file_size = bytes.len() as u64;
        state
            .files
            .store_file(
                &file_name,
                StoredFile {
                    bytes,
                    original_name: original_name.clone(),
                    file_size,
                    mime_type,
                },
            )
            .await?;

        info!("Stored upload {original_name} as {file_name} ({file_size} bytes)");

        return Ok(Json(UploadResponse {
            success: true,
            file_name,
            original_name,
            file_size,
        }));
    }

    Err(AppError::Validation("No file provided".to_string()))
}

/// GET /api/v1/uploads/check?file_name=
pub async fn handle_check_upload(
    State(state): State<AppState>,
    Query(params): Query<FileCheckQuery>,
) -> Result<Json<FileCheckResponse>, AppError> {
    let file_name = params
        .file_name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::Validation("File name is required".to_string()))?;

    let exists = state.files.file_exists(&file_name).await?;
    Ok(Json(FileCheckResponse { exists, file_name }))
}

/// GET /api/v1/storage/status
///
/// Names only; file content is never returned.
pub async fn handle_storage_status(
    State(state): State<AppState>,
) -> Result<Json<StorageStatusResponse>, AppError> {
    let names = state.files.list_files().await?;
    Ok(Json(StorageStatusResponse {
        success: true,
        file_count: names.len(),
        files: names
            .into_iter()
            .map(|file_name| StoredFileEntry { file_name })
            .collect(),
    }))
}
