//! Profile document endpoints.
//!
//! - GET  /api/profile - the whole profile document
//! - POST /api/profile - replace the profile document

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use keepsake_core::store::RecordStore;
use keepsake_types::profile::Profile;

use crate::http::error::AppError;
use crate::state::AppState;

/// GET /api/profile
pub async fn get_profile(State(state): State<AppState>) -> Result<Json<Profile>, AppError> {
    let profile = state.store.load_profile().await?;
    Ok(Json(profile))
}

/// POST /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Json(profile): Json<Profile>,
) -> Result<Json<Value>, AppError> {
    state.store.save_profile(&profile).await?;
    Ok(Json(json!({ "status": "success", "profile": profile })))
}
