//! In-process session registry.
//!
//! One [`SessionState`] per caller-supplied session identifier, created
//! lazily on first chat call and kept for process lifetime. Each session is
//! guarded by its own `tokio::sync::Mutex`: the chat flow holds the lock for
//! the whole turn, so requests for the same session serialize while distinct
//! sessions proceed concurrently.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use keepsake_types::chat::Turn;

use crate::mention::MentionTable;

/// Session identifier used when the caller does not supply one.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Mutable per-session state: the ordered conversation and mention counters.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Authoritative conversation history, sent verbatim to the backend.
    pub turns: Vec<Turn>,
    pub mentions: MentionTable,
}

impl SessionState {
    /// Whether the priming turn pair has been seeded.
    pub fn is_bootstrapped(&self) -> bool {
        !self.turns.is_empty()
    }
}

/// Registry of live sessions keyed by session identifier.
///
/// No eviction: sessions accumulate for the life of the process.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Mutex<SessionState>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the session for an identifier, creating it on first use.
    pub fn get_or_create(&self, session_id: &str) -> Arc<Mutex<SessionState>> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(Default::default)
            .clone()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lazy_creation() {
        let registry = SessionRegistry::new();
        assert!(!registry.contains("s1"));

        let session = registry.get_or_create("s1");
        assert!(registry.contains("s1"));
        assert!(!session.lock().await.is_bootstrapped());
    }

    #[tokio::test]
    async fn test_same_id_returns_same_session() {
        let registry = SessionRegistry::new();
        let first = registry.get_or_create("s1");
        first.lock().await.turns.push(Turn::user("hello"));

        let second = registry.get_or_create("s1");
        assert_eq!(second.lock().await.turns.len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_ids_are_isolated() {
        let registry = SessionRegistry::new();
        let one = registry.get_or_create("s1");
        one.lock().await.turns.push(Turn::user("hello"));

        let other = registry.get_or_create("s2");
        assert!(other.lock().await.turns.is_empty());
        assert_eq!(registry.len(), 2);
    }
}
