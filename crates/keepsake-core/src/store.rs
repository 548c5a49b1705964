//! RecordStore trait definition.
//!
//! Whole-document load/save for every persisted record type. Loads recover
//! from missing or corrupt documents by returning defaults (implementations
//! log the recovery); only real I/O failures surface as errors. Saves are
//! whole-document, last writer wins.
//!
//! Implementations live in keepsake-infra (e.g., `JsonFileStore`). Uses
//! native async fn in traits (RPITIT, Rust 2024 edition).

use keepsake_types::chat::ChatEntry;
use keepsake_types::error::StoreError;
use keepsake_types::memory::MemoryDocument;
use keepsake_types::profile::{FamilyMember, Note, Profile, Routine};

/// Store trait for the persisted JSON documents.
pub trait RecordStore: Send + Sync {
    fn load_memory_document(
        &self,
    ) -> impl std::future::Future<Output = Result<MemoryDocument, StoreError>> + Send;

    fn save_memory_document(
        &self,
        document: &MemoryDocument,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    fn load_profile(
        &self,
    ) -> impl std::future::Future<Output = Result<Profile, StoreError>> + Send;

    fn save_profile(
        &self,
        profile: &Profile,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    fn load_routines(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Routine>, StoreError>> + Send;

    fn save_routines(
        &self,
        routines: &[Routine],
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    fn load_family(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<FamilyMember>, StoreError>> + Send;

    fn save_family(
        &self,
        family: &[FamilyMember],
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    fn load_chat_log(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ChatEntry>, StoreError>> + Send;

    fn save_chat_log(
        &self,
        entries: &[ChatEntry],
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    fn load_notes(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Note>, StoreError>> + Send;

    fn save_notes(
        &self,
        notes: &[Note],
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
