//! Upload-blob storage.
//!
//! Uploaded files land under `uploads/` in the data directory, prefixed with
//! a fresh UUID so original names can never collide or overwrite each other.

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Directory holding uploaded blobs.
pub fn uploads_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("uploads")
}

/// Store an uploaded blob and return its stored file name.
pub async fn store_upload(
    data_dir: &Path,
    original_name: &str,
    bytes: &[u8],
) -> io::Result<String> {
    let dir = uploads_dir(data_dir);
    tokio::fs::create_dir_all(&dir).await?;

    let stored_name = format!("{}_{}", Uuid::new_v4(), original_name);
    tokio::fs::write(dir.join(&stored_name), bytes).await?;
    Ok(stored_name)
}
