//! File upload endpoint.
//!
//! POST /api/upload (multipart) stores the blob under `uploads/` in the data
//! directory and returns the URL it will be served from.

use axum::Json;
use axum::extract::{Multipart, State};
use serde_json::{Value, json};

use keepsake_infra::storage::uploads::store_upload;

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /api/upload - store an uploaded file.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::Validation(error.to_string()))?
    {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|error| AppError::Validation(error.to_string()))?;
            file = Some((name, bytes.to_vec()));
            break;
        }
    }

    let Some((name, bytes)) = file else {
        return Err(AppError::Validation("No file part".to_string()));
    };
    if name.is_empty() {
        return Err(AppError::Validation("No selected file".to_string()));
    }

    let stored = store_upload(&state.data_dir, &name, &bytes)
        .await
        .map_err(|error| AppError::Internal(format!("Failed to store upload: {error}")))?;

    Ok(Json(json!({ "url": format!("/uploads/{stored}") })))
}
