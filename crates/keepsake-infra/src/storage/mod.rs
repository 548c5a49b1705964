//! JSON-document file storage.
//!
//! Each persisted record type is one pretty-printed JSON file under the data
//! directory, loaded and saved as a whole (last writer wins). Missing files
//! and corrupt content both recover to defaults -- corrupt storage is never
//! fatal, only logged.

pub mod uploads;

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use keepsake_core::store::RecordStore;
use keepsake_types::chat::ChatEntry;
use keepsake_types::error::StoreError;
use keepsake_types::memory::MemoryDocument;
use keepsake_types::profile::{FamilyMember, Note, Profile, Routine};

pub const MEMORIES_FILE: &str = "memories.json";
pub const PROFILE_FILE: &str = "profile.json";
pub const ROUTINES_FILE: &str = "routines.json";
pub const FAMILY_FILE: &str = "family.json";
pub const CHAT_FILE: &str = "chat.json";
pub const NOTES_FILE: &str = "notes.json";

/// File-backed implementation of the `RecordStore` trait.
///
/// All I/O goes through `tokio::fs`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    /// Load one document, falling back to defaults when the file is missing
    /// or its content does not parse.
    async fn load_document<T>(&self, file_name: &'static str) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.path(file_name);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
            Err(error) => {
                return Err(StoreError::Read {
                    name: file_name,
                    source: error,
                });
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(error) => {
                tracing::warn!(
                    file = file_name,
                    %error,
                    "corrupt document; falling back to defaults"
                );
                Ok(T::default())
            }
        }
    }

    /// Save one document, pretty-printed, creating the data dir on demand.
    async fn save_document<T: Serialize>(
        &self,
        file_name: &'static str,
        value: &T,
    ) -> Result<(), StoreError> {
        let path = self.path(file_name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| StoreError::Write {
                    name: file_name,
                    source: error,
                })?;
        }
        let encoded = serde_json::to_string_pretty(value)
            .map_err(|error| StoreError::Encode(file_name, error))?;
        tokio::fs::write(&path, encoded)
            .await
            .map_err(|error| StoreError::Write {
                name: file_name,
                source: error,
            })
    }
}

/// On-disk shape of the notes document: wrapped in an object, but a bare
/// array written by older versions still reads.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum NotesOnDisk {
    Wrapped {
        #[serde(default)]
        notes: Vec<Note>,
    },
    Bare(Vec<Note>),
}

impl Default for NotesOnDisk {
    fn default() -> Self {
        NotesOnDisk::Bare(Vec::new())
    }
}

impl NotesOnDisk {
    fn into_notes(self) -> Vec<Note> {
        match self {
            NotesOnDisk::Wrapped { notes } => notes,
            NotesOnDisk::Bare(notes) => notes,
        }
    }
}

impl RecordStore for JsonFileStore {
    async fn load_memory_document(&self) -> Result<MemoryDocument, StoreError> {
        self.load_document(MEMORIES_FILE).await
    }

    async fn save_memory_document(&self, document: &MemoryDocument) -> Result<(), StoreError> {
        self.save_document(MEMORIES_FILE, document).await
    }

    async fn load_profile(&self) -> Result<Profile, StoreError> {
        self.load_document(PROFILE_FILE).await
    }

    async fn save_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.save_document(PROFILE_FILE, profile).await
    }

    async fn load_routines(&self) -> Result<Vec<Routine>, StoreError> {
        self.load_document(ROUTINES_FILE).await
    }

    async fn save_routines(&self, routines: &[Routine]) -> Result<(), StoreError> {
        self.save_document(ROUTINES_FILE, &routines).await
    }

    async fn load_family(&self) -> Result<Vec<FamilyMember>, StoreError> {
        self.load_document(FAMILY_FILE).await
    }

    async fn save_family(&self, family: &[FamilyMember]) -> Result<(), StoreError> {
        self.save_document(FAMILY_FILE, &family).await
    }

    async fn load_chat_log(&self) -> Result<Vec<ChatEntry>, StoreError> {
        self.load_document(CHAT_FILE).await
    }

    async fn save_chat_log(&self, entries: &[ChatEntry]) -> Result<(), StoreError> {
        self.save_document(CHAT_FILE, &entries).await
    }

    async fn load_notes(&self) -> Result<Vec<Note>, StoreError> {
        let on_disk: NotesOnDisk = self.load_document(NOTES_FILE).await?;
        Ok(on_disk.into_notes())
    }

    async fn save_notes(&self, notes: &[Note]) -> Result<(), StoreError> {
        self.save_document(NOTES_FILE, &serde_json::json!({ "notes": notes }))
            .await
    }
}

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `KEEPSAKE_DATA_DIR` environment variable
/// 2. Platform home directory (`~/.keepsake`)
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("KEEPSAKE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".keepsake");
    }

    // Last resort: current directory
    PathBuf::from(".keepsake")
}
