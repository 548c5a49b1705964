//! Chat endpoints.
//!
//! - POST /api/chat      - one conversational turn
//! - POST /api/save-chat - replace the chat log document wholesale

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use keepsake_core::companion::ChatOutcome;
use keepsake_core::session::DEFAULT_SESSION_ID;
use keepsake_core::store::RecordStore;
use keepsake_types::chat::ChatEntry;

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for the chat endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user utterance. Empty or missing is rejected.
    #[serde(default)]
    pub message: String,
    /// Session identifier; one is assigned when the caller omits it.
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

fn default_session_id() -> String {
    DEFAULT_SESSION_ID.to_string()
}

/// POST /api/chat - handle one chat turn and return the interpreted reply.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatOutcome>, AppError> {
    let outcome = state.companion.chat(&body.session_id, &body.message).await?;
    Ok(Json(outcome))
}

/// POST /api/save-chat - replace the chat log document.
pub async fn save_chat(
    State(state): State<AppState>,
    Json(entries): Json<Vec<ChatEntry>>,
) -> Result<Json<Value>, AppError> {
    state.store.save_chat_log(&entries).await?;
    Ok(Json(json!({ "message": "Chat saved successfully!" })))
}
