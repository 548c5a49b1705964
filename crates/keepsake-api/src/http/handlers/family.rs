//! Family document endpoints.
//!
//! - GET  /api/family - the whole family list
//! - POST /api/family - replace the family list

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use keepsake_core::store::RecordStore;
use keepsake_types::profile::FamilyMember;

use crate::http::error::AppError;
use crate::state::AppState;

/// GET /api/family
pub async fn get_family(
    State(state): State<AppState>,
) -> Result<Json<Vec<FamilyMember>>, AppError> {
    let family = state.store.load_family().await?;
    Ok(Json(family))
}

/// POST /api/family
pub async fn update_family(
    State(state): State<AppState>,
    Json(family): Json<Vec<FamilyMember>>,
) -> Result<Json<Value>, AppError> {
    state.store.save_family(&family).await?;
    Ok(Json(json!({ "status": "success", "family": family })))
}
