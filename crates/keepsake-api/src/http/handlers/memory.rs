//! Memory document endpoints.
//!
//! - GET  /api/memories              - the saved-memories array only
//! - POST /api/memories              - replace the saved-memories array
//! - POST /api/save-memory-from-chat - persist a confirmed memory
//! - POST /api/memories/merge        - fold an extracted fragment in

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use keepsake_core::companion::{ConfirmRequest, now_iso};
use keepsake_core::store::RecordStore;
use keepsake_types::memory::{MemoryFragment, MemoryRecord};

use crate::http::error::AppError;
use crate::state::AppState;

/// GET /api/memories - return only the `memories` array of the document.
pub async fn get_memories(
    State(state): State<AppState>,
) -> Result<Json<Vec<MemoryRecord>>, AppError> {
    let document = state.store.load_memory_document().await?;
    Ok(Json(document.memories))
}

/// POST /api/memories - replace the `memories` array wholesale.
///
/// The other categories of the document are preserved.
pub async fn replace_memories(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let Some(items) = body.as_array() else {
        return Err(AppError::Validation("Data must be a list".to_string()));
    };
    let memories = items
        .iter()
        .map(|item| {
            item.as_object().cloned().ok_or_else(|| {
                AppError::Validation("Memory entries must be objects".to_string())
            })
        })
        .collect::<Result<Vec<MemoryRecord>, AppError>>()?;

    let mut document = state.store.load_memory_document().await?;
    document.memories = memories;
    document.touch(now_iso());
    state.store.save_memory_document(&document).await?;

    Ok(Json(json!({ "status": "success", "memories": document.memories })))
}

/// POST /api/save-memory-from-chat - persist a memory derived from chat.
///
/// The raw chat message stays in the chat log; only the structured record
/// (source "chat", optional `chatRef`) lands in the memory document.
pub async fn save_memory_from_chat(
    State(state): State<AppState>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<Value>, AppError> {
    let memory = state.companion.confirm_memory(request).await?;
    Ok(Json(json!({ "status": "success", "memory": memory })))
}

/// POST /api/memories/merge - fold a full extracted fragment into the
/// document, returning skipped-item diagnostics.
pub async fn merge_extracted(
    State(state): State<AppState>,
    Json(fragment): Json<MemoryFragment>,
) -> Result<Json<Value>, AppError> {
    let outcome = state.companion.merge_fragment(&fragment).await?;
    Ok(Json(json!({ "status": "success", "skipped": outcome.skipped })))
}
