//! Routines document endpoints.
//!
//! - GET  /api/routines - the whole routines list
//! - POST /api/routines - replace the routines list

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use keepsake_core::store::RecordStore;
use keepsake_types::profile::Routine;

use crate::http::error::AppError;
use crate::state::AppState;

/// GET /api/routines
pub async fn get_routines(State(state): State<AppState>) -> Result<Json<Vec<Routine>>, AppError> {
    let routines = state.store.load_routines().await?;
    Ok(Json(routines))
}

/// POST /api/routines
pub async fn update_routines(
    State(state): State<AppState>,
    Json(routines): Json<Vec<Routine>>,
) -> Result<Json<Value>, AppError> {
    state.store.save_routines(&routines).await?;
    Ok(Json(json!({ "status": "success", "routines": routines })))
}
