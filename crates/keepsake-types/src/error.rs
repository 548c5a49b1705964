use thiserror::Error;

use crate::backend::BackendError;

/// Errors from document storage operations.
///
/// Corrupt documents are NOT an error: stores recover by falling back to
/// defaults. Only real I/O failures surface here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {name}: {source}")]
    Read {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {name}: {source}")]
    Write {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {0}: {1}")]
    Encode(&'static str, #[source] serde_json::Error),
}

/// Errors from strict-mode merging of an extracted fragment.
///
/// Lenient merges never produce these; invalid items are skipped and
/// reported as diagnostics instead.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("invalid item in '{category}': expected {expected}")]
    InvalidItem {
        category: String,
        expected: &'static str,
    },
}

/// Errors surfaced by the companion service to its caller.
#[derive(Debug, Error)]
pub enum CompanionError {
    #[error("no message provided")]
    EmptyMessage,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Merge(#[from] MergeError),
}
