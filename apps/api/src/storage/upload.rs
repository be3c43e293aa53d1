//! Resume upload rules: accepted types, size cap and stored naming.

use chrono::{DateTime, Utc};

use crate::errors::AppError;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Checks type, then size, then name.
pub fn validate_upload(original_name: &str, mime_type: &str, size: usize) -> Result<(), AppError> {
    if !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Err(AppError::Validation(
            "Invalid file type. Only PDF, DOC, and DOCX files are allowed.".to_string(),
        ));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(
            "File too large. Maximum size is 5MB.".to_string(),
        ));
    }
    if original_name.trim().is_empty() {
        return Err(AppError::Validation("Invalid file name.".to_string()));
    }
    Ok(())
}

/// `resume_<unix millis>.<extension>`, extension lower-cased.
///
/// A name without a dot contributes the whole name as its extension.
pub fn stored_file_name(original_name: &str, now: DateTime<Utc>) -> String {
    let extension = original_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    format!("resume_{}.{}", now.timestamp_millis(), extension)
}
