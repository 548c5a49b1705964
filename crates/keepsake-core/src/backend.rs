//! GenerativeBackend trait definition.
//!
//! The generative backend is an opaque collaborator: it receives the full
//! ordered turn list plus fixed generation parameters and returns free text,
//! usually carrying the embedded JSON object that [`crate::interpret`]
//! decodes. Implementations live in keepsake-infra (e.g., `GeminiBackend`).
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use keepsake_types::backend::{BackendError, GenerationParams};
use keepsake_types::chat::Turn;

/// Trait for generative text backends.
pub trait GenerativeBackend: Send + Sync {
    /// Human-readable backend name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Generate a reply for the given conversation.
    ///
    /// One blocking round-trip, no retry; transport and non-success HTTP
    /// statuses surface as [`BackendError`].
    fn generate(
        &self,
        turns: &[Turn],
        params: &GenerationParams,
    ) -> impl std::future::Future<Output = Result<String, BackendError>> + Send;
}
