//! Notes endpoints.
//!
//! - GET  /api/notes - the full notes list
//! - POST /api/notes - add one note (object body) or replace the full list
//!   for bulk sync (array body)

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use keepsake_core::companion::now_iso;
use keepsake_core::store::RecordStore;
use keepsake_types::profile::Note;

use crate::http::error::AppError;
use crate::state::AppState;

/// POST body: either a bulk replacement list or one new note.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NotesPayload {
    Bulk(Vec<Note>),
    One(NewNote),
}

/// Fields accepted for a single new note.
#[derive(Debug, Deserialize)]
pub struct NewNote {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// GET /api/notes
pub async fn get_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, AppError> {
    let notes = state.store.load_notes().await?;
    Ok(Json(notes))
}

/// POST /api/notes
pub async fn post_notes(
    State(state): State<AppState>,
    Json(payload): Json<NotesPayload>,
) -> Result<Json<Value>, AppError> {
    match payload {
        NotesPayload::Bulk(notes) => {
            state.store.save_notes(&notes).await?;
            Ok(Json(json!({ "status": "success", "notes": notes })))
        }
        NotesPayload::One(new_note) => {
            let title = new_note.title.trim();
            let note = Note {
                id: Uuid::new_v4().to_string(),
                title: if title.is_empty() {
                    "Untitled Note".to_string()
                } else {
                    title.to_string()
                },
                content: new_note.content.trim().to_string(),
                created_at: now_iso(),
            };

            let mut notes = state.store.load_notes().await?;
            notes.push(note.clone());
            state.store.save_notes(&notes).await?;
            Ok(Json(json!({ "status": "success", "note": note })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_array_is_bulk() {
        let payload: NotesPayload =
            serde_json::from_str(r#"[{"id":"n1","title":"t","content":"","created_at":""}]"#)
                .unwrap();
        assert!(matches!(payload, NotesPayload::Bulk(ref notes) if notes.len() == 1));
    }

    #[test]
    fn test_payload_object_is_single_note() {
        let payload: NotesPayload =
            serde_json::from_str(r#"{"title":"  Groceries  ","content":"bread"}"#).unwrap();
        match payload {
            NotesPayload::One(note) => {
                assert_eq!(note.title, "  Groceries  ");
                assert_eq!(note.content, "bread");
            }
            NotesPayload::Bulk(_) => panic!("expected single note"),
        }
    }
}
