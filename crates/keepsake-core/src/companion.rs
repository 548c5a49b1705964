//! Companion service orchestrating the chat turn lifecycle.
//!
//! One chat call: extract keywords, update mention counters (possibly
//! flagging a repeated topic), bootstrap the session on first use, append
//! the user turn (with the repeated-topic directive when flagged), call the
//! generative backend with the full turn list, append the raw reply, decode
//! it, and append the exchange to the durable chat log.
//!
//! Generic over [`GenerativeBackend`] and [`RecordStore`] so keepsake-core
//! never depends on keepsake-infra.

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use keepsake_types::backend::GenerationParams;
use keepsake_types::chat::{ChatEntry, Turn};
use keepsake_types::error::{CompanionError, StoreError};
use keepsake_types::memory::{ConfirmProposal, MemoryActions, MemoryFragment, SavedMemory};

use crate::backend::GenerativeBackend;
use crate::context::{PrimingInputs, build_priming_turns};
use crate::interpret::interpret;
use crate::keyword::extract_keywords;
use crate::merge::{MergeOutcome, MergeStrictness, merge};
use crate::session::SessionRegistry;
use crate::store::RecordStore;

/// Sender label for user entries in the chat log.
pub const USER_SENDER: &str = "User";

/// Sender label for companion entries in the chat log.
pub const COMPANION_SENDER: &str = "Keepsake";

/// Result of one chat turn, returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    /// The conversational reply text.
    pub message: String,
    pub extracted_data: MemoryFragment,
    pub memory_actions: MemoryActions,
    /// Non-null means the double-mention rule fired this turn.
    pub memory_to_confirm: Option<ConfirmProposal>,
    pub timestamp: String,
    /// Id of the user's chat-log entry, usable as `chatRef` when the user
    /// confirms saving a memory derived from this exchange.
    pub chat_message_id: String,
    pub session_id: String,
}

/// Caller request to persist a confirmed memory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    #[serde(default, rename = "mediaPath")]
    pub media_path: Option<String>,
    #[serde(default, rename = "chatRef")]
    pub chat_ref: Option<String>,
}

/// The companion service: session registry plus backend and store handles.
pub struct CompanionService<B, S> {
    backend: B,
    store: S,
    sessions: SessionRegistry,
    params: GenerationParams,
}

impl<B: GenerativeBackend, S: RecordStore> CompanionService<B, S> {
    pub fn new(backend: B, store: S) -> Self {
        Self {
            backend,
            store,
            sessions: SessionRegistry::new(),
            params: GenerationParams::default(),
        }
    }

    /// Access the session registry (read-only observation).
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Handle one chat turn for a session.
    ///
    /// The session lock is held for the whole turn, so concurrent calls for
    /// the same session serialize; distinct sessions proceed concurrently.
    pub async fn chat(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<ChatOutcome, CompanionError> {
        if message.is_empty() {
            return Err(CompanionError::EmptyMessage);
        }

        let keywords = extract_keywords(message);
        let handle = self.sessions.get_or_create(session_id);
        let mut session = handle.lock().await;

        let repeated_topic = session.mentions.record(&keywords);
        if let Some(topic) = &repeated_topic {
            tracing::info!(session_id, topic = %topic, "repeated topic flagged");
        }

        if !session.is_bootstrapped() {
            let profile = self.store.load_profile().await?;
            let routines = self.store.load_routines().await?;
            let memory = self.store.load_memory_document().await?;
            let family = self.store.load_family().await?;
            let chat_log = self.store.load_chat_log().await?;
            let inputs = PrimingInputs {
                profile: &profile,
                routines: &routines,
                memory: &memory,
                family: &family,
                chat_log: &chat_log,
            };
            let (priming, ack) = build_priming_turns(&inputs, Local::now().naive_local());
            session.turns.push(priming);
            session.turns.push(ack);
            tracing::debug!(session_id, "session bootstrapped");
        }

        let user_text = match &repeated_topic {
            Some(topic) => format!(
                "{message}\n\n[REPEATED TOPIC: The user has now mentioned '{topic}' at least \
                 twice in this session. Please gently offer to save this as a memory and \
                 populate 'memory_to_confirm' in your JSON response.]"
            ),
            None => message.to_string(),
        };
        session.turns.push(Turn::user(user_text));

        // On failure the outbound user turn stays in history; whether that
        // orphan should survive is an open product question, so the behavior
        // is kept as-is.
        let raw_reply = self.backend.generate(&session.turns, &self.params).await?;
        session.turns.push(Turn::model(raw_reply.clone()));

        let (reply_text, extracted, actions, confirm) = interpret(&raw_reply).into_parts();
        if !extracted.is_empty() {
            tracing::debug!(session_id, "turn carried extracted data");
        }
        if let Some(proposal) = &confirm {
            tracing::info!(session_id, title = %proposal.title, "memory confirmation proposed");
        }
        if !actions.is_empty() {
            tracing::debug!(
                session_id,
                surfaced = %actions.surfaced_memory,
                mode = %actions.surfacing_mode,
                "memory surfaced"
            );
        }

        let timestamp = now_iso();
        let user_message_id = Uuid::new_v4().to_string();
        if let Err(error) = self
            .append_exchange(&user_message_id, message, &reply_text, &timestamp)
            .await
        {
            tracing::warn!(%error, "failed to append exchange to chat log");
        }

        Ok(ChatOutcome {
            message: reply_text,
            extracted_data: extracted,
            memory_actions: actions,
            memory_to_confirm: confirm,
            timestamp,
            chat_message_id: user_message_id,
            session_id: session_id.to_string(),
        })
    }

    /// Append the user/companion exchange to the durable chat log.
    async fn append_exchange(
        &self,
        user_message_id: &str,
        user_message: &str,
        reply: &str,
        timestamp: &str,
    ) -> Result<(), StoreError> {
        let mut entries = self.store.load_chat_log().await?;
        entries.push(ChatEntry {
            id: user_message_id.to_string(),
            timestamp: timestamp.to_string(),
            sender: USER_SENDER.to_string(),
            content: user_message.to_string(),
        });
        entries.push(ChatEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: now_iso(),
            sender: COMPANION_SENDER.to_string(),
            content: reply.to_string(),
        });
        self.store.save_chat_log(&entries).await
    }

    /// Persist a confirmed memory into the `memories` category.
    ///
    /// The record goes through the merge engine, so re-confirming an
    /// identical record cannot duplicate it.
    pub async fn confirm_memory(
        &self,
        request: ConfirmRequest,
    ) -> Result<SavedMemory, CompanionError> {
        let memory = SavedMemory {
            id: Uuid::new_v4().to_string(),
            title: request
                .title
                .unwrap_or_else(|| "Untitled Memory".to_string()),
            date: request
                .date
                .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string()),
            description: request.description.unwrap_or_default(),
            media_path: request.media_path,
            source: "chat".to_string(),
            chat_ref: request.chat_ref,
        };

        let fragment = MemoryFragment {
            memories: vec![json!({
                "id": memory.id,
                "title": memory.title,
                "date": memory.date,
                "description": memory.description,
                "mediaPath": memory.media_path,
                "source": memory.source,
                "chatRef": memory.chat_ref,
            })],
            ..MemoryFragment::default()
        };

        let document = self.store.load_memory_document().await?;
        let mut outcome = merge(document, &fragment, MergeStrictness::Lenient)?;
        outcome.document.touch(now_iso());
        self.store.save_memory_document(&outcome.document).await?;
        tracing::info!(title = %memory.title, "memory confirmed and saved");
        Ok(memory)
    }

    /// Fold a full extracted fragment into the memory document and persist.
    pub async fn merge_fragment(
        &self,
        fragment: &MemoryFragment,
    ) -> Result<MergeOutcome, CompanionError> {
        let document = self.store.load_memory_document().await?;
        let mut outcome = merge(document, fragment, MergeStrictness::Lenient)?;
        outcome.document.touch(now_iso());
        self.store.save_memory_document(&outcome.document).await?;
        if !outcome.skipped.is_empty() {
            tracing::warn!(count = outcome.skipped.len(), "merge skipped invalid items");
        }
        Ok(outcome)
    }
}

/// Local wall-clock time in ISO-8601 form.
pub fn now_iso() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use keepsake_types::backend::BackendError;
    use keepsake_types::chat::TurnRole;
    use keepsake_types::memory::MemoryDocument;
    use keepsake_types::profile::{FamilyMember, Note, Profile, Routine};

    #[derive(Default)]
    struct InMemoryState {
        memory: Mutex<MemoryDocument>,
        profile: Mutex<Profile>,
        routines: Mutex<Vec<Routine>>,
        family: Mutex<Vec<FamilyMember>>,
        chat: Mutex<Vec<ChatEntry>>,
        notes: Mutex<Vec<Note>>,
    }

    #[derive(Clone, Default)]
    struct InMemoryStore(Arc<InMemoryState>);

    impl RecordStore for InMemoryStore {
        async fn load_memory_document(&self) -> Result<MemoryDocument, StoreError> {
            Ok(self.0.memory.lock().unwrap().clone())
        }

        async fn save_memory_document(
            &self,
            document: &MemoryDocument,
        ) -> Result<(), StoreError> {
            *self.0.memory.lock().unwrap() = document.clone();
            Ok(())
        }

        async fn load_profile(&self) -> Result<Profile, StoreError> {
            Ok(self.0.profile.lock().unwrap().clone())
        }

        async fn save_profile(&self, profile: &Profile) -> Result<(), StoreError> {
            *self.0.profile.lock().unwrap() = profile.clone();
            Ok(())
        }

        async fn load_routines(&self) -> Result<Vec<Routine>, StoreError> {
            Ok(self.0.routines.lock().unwrap().clone())
        }

        async fn save_routines(&self, routines: &[Routine]) -> Result<(), StoreError> {
            *self.0.routines.lock().unwrap() = routines.to_vec();
            Ok(())
        }

        async fn load_family(&self) -> Result<Vec<FamilyMember>, StoreError> {
            Ok(self.0.family.lock().unwrap().clone())
        }

        async fn save_family(&self, family: &[FamilyMember]) -> Result<(), StoreError> {
            *self.0.family.lock().unwrap() = family.to_vec();
            Ok(())
        }

        async fn load_chat_log(&self) -> Result<Vec<ChatEntry>, StoreError> {
            Ok(self.0.chat.lock().unwrap().clone())
        }

        async fn save_chat_log(&self, entries: &[ChatEntry]) -> Result<(), StoreError> {
            *self.0.chat.lock().unwrap() = entries.to_vec();
            Ok(())
        }

        async fn load_notes(&self) -> Result<Vec<Note>, StoreError> {
            Ok(self.0.notes.lock().unwrap().clone())
        }

        async fn save_notes(&self, notes: &[Note]) -> Result<(), StoreError> {
            *self.0.notes.lock().unwrap() = notes.to_vec();
            Ok(())
        }
    }

    #[derive(Default)]
    struct ScriptedState {
        replies: Mutex<VecDeque<Result<String, BackendError>>>,
        requests: Mutex<Vec<Vec<Turn>>>,
    }

    #[derive(Clone, Default)]
    struct ScriptedBackend(Arc<ScriptedState>);

    impl ScriptedBackend {
        fn push_reply(&self, reply: &str) {
            self.0
                .replies
                .lock()
                .unwrap()
                .push_back(Ok(reply.to_string()));
        }

        fn push_failure(&self, error: BackendError) {
            self.0.replies.lock().unwrap().push_back(Err(error));
        }

        fn requests(&self) -> Vec<Vec<Turn>> {
            self.0.requests.lock().unwrap().clone()
        }
    }

    impl GenerativeBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(
            &self,
            turns: &[Turn],
            _params: &GenerationParams,
        ) -> Result<String, BackendError> {
            self.0.requests.lock().unwrap().push(turns.to_vec());
            self.0
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(r#"{"response":"ok","extracted_data":{}}"#.to_string()))
        }
    }

    fn service() -> (
        CompanionService<ScriptedBackend, InMemoryStore>,
        ScriptedBackend,
        InMemoryStore,
    ) {
        let backend = ScriptedBackend::default();
        let store = InMemoryStore::default();
        let service = CompanionService::new(backend.clone(), store.clone());
        (service, backend, store)
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let (service, _, _) = service();
        let result = service.chat("s1", "").await;
        assert!(matches!(result, Err(CompanionError::EmptyMessage)));
    }

    #[tokio::test]
    async fn test_bootstrap_seeds_priming_pair_once() {
        let (service, _, _) = service();
        service.chat("s1", "Hello there friend").await.unwrap();
        service.chat("s1", "Another message entirely").await.unwrap();

        let handle = service.sessions().get_or_create("s1");
        let session = handle.lock().await;
        // 2 priming-pair turns + 2 exchanges of 2 turns each.
        assert_eq!(session.turns.len(), 6);
        let priming_count = session
            .turns
            .iter()
            .filter(|t| t.role == TurnRole::Priming)
            .count();
        assert_eq!(priming_count, 1);
    }

    #[tokio::test]
    async fn test_reply_fields_flow_through() {
        let (service, backend, _) = service();
        backend.push_reply(
            r#"Here you go: {"response":"Lovely to hear about the roses.","extracted_data":{"interests":["roses"]},"memory_actions":{"surfaced_memory":"Summer vacay","surfacing_mode":"echo","reason_for_surfacing":"topic"},"memory_to_confirm":null}"#,
        );
        let outcome = service.chat("s1", "My roses bloomed today").await.unwrap();

        assert_eq!(outcome.message, "Lovely to hear about the roses.");
        assert_eq!(outcome.extracted_data.interests.len(), 1);
        assert_eq!(outcome.memory_actions.surfaced_memory, "Summer vacay");
        assert!(outcome.memory_to_confirm.is_none());
        assert_eq!(outcome.session_id, "s1");
    }

    #[tokio::test]
    async fn test_repeated_topic_directive_injected_once() {
        let (service, backend, _) = service();
        service.chat("s1", "The garden was lovely").await.unwrap();
        service.chat("s1", "My garden is blooming").await.unwrap();
        service.chat("s1", "garden paths need sweeping").await.unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 3);

        let last_user_text = |turns: &[Turn]| turns.last().unwrap().text.clone();
        assert!(!last_user_text(&requests[0]).contains("[REPEATED TOPIC:"));
        assert!(
            last_user_text(&requests[1])
                .contains("[REPEATED TOPIC: The user has now mentioned 'garden'")
        );
        // Third mention of the same token never re-prompts.
        assert!(!last_user_text(&requests[2]).contains("[REPEATED TOPIC:"));
    }

    #[tokio::test]
    async fn test_distinct_tokens_flag_independently() {
        let (service, backend, _) = service();
        // "gardening", "garden", "gardens" are tracked token-literally.
        service.chat("s1", "I love gardening").await.unwrap();
        service
            .chat("s1", "My garden is my favorite place")
            .await
            .unwrap();
        service.chat("s1", "Gardens again!").await.unwrap();

        let requests = backend.requests();
        for request in &requests {
            assert!(!request.last().unwrap().text.contains("[REPEATED TOPIC:"));
        }

        // Only when a specific token repeats does the directive appear.
        service.chat("s1", "gardening calms me down").await.unwrap();
        let requests = backend.requests();
        assert!(
            requests[3]
                .last()
                .unwrap()
                .text
                .contains("mentioned 'gardening'")
        );
    }

    #[tokio::test]
    async fn test_backend_failure_leaves_orphan_user_turn() {
        let (service, backend, store) = service();
        backend.push_failure(BackendError::Status {
            status: 503,
            body: "overloaded".to_string(),
        });

        let result = service.chat("s1", "Hello there friend").await;
        assert!(matches!(result, Err(CompanionError::Backend(_))));

        // The outbound user turn is already in history; no model turn follows.
        let handle = service.sessions().get_or_create("s1");
        let session = handle.lock().await;
        assert_eq!(session.turns.len(), 3);
        assert_eq!(session.turns.last().unwrap().role, TurnRole::User);

        // Durable documents are untouched by the aborted turn.
        assert!(store.0.chat.lock().unwrap().is_empty());
        assert_eq!(*store.0.memory.lock().unwrap(), MemoryDocument::default());
    }

    #[tokio::test]
    async fn test_exchange_appended_to_chat_log() {
        let (service, backend, store) = service();
        backend.push_reply(r#"{"response":"How wonderful.","extracted_data":{}}"#);
        let outcome = service.chat("s1", "We baked bread today").await.unwrap();

        let entries = store.0.chat.lock().unwrap().clone();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].sender, USER_SENDER);
        assert_eq!(entries[0].content, "We baked bread today");
        assert_eq!(entries[0].id, outcome.chat_message_id);
        assert_eq!(entries[1].sender, COMPANION_SENDER);
        assert_eq!(entries[1].content, "How wonderful.");
        assert_ne!(entries[1].id, entries[0].id);
    }

    #[tokio::test]
    async fn test_confirm_memory_defaults_and_persists() {
        let (service, _, store) = service();
        let saved = service
            .confirm_memory(ConfirmRequest::default())
            .await
            .unwrap();

        assert_eq!(saved.title, "Untitled Memory");
        assert_eq!(saved.source, "chat");
        assert_eq!(saved.date.len(), 10);
        assert!(saved.description.is_empty());

        let document = store.0.memory.lock().unwrap().clone();
        assert_eq!(document.memories.len(), 1);
        assert!(document.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_confirm_memory_keeps_chat_ref() {
        let (service, _, store) = service();
        let saved = service
            .confirm_memory(ConfirmRequest {
                title: Some("Garden afternoons".to_string()),
                description: Some("Tending roses with Ana".to_string()),
                date: Some("2026-08-01".to_string()),
                media_path: None,
                chat_ref: Some("msg-42".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(saved.chat_ref.as_deref(), Some("msg-42"));

        let document = store.0.memory.lock().unwrap().clone();
        let record = &document.memories[0];
        assert_eq!(record["title"], "Garden afternoons");
        assert_eq!(record["chatRef"], "msg-42");
        assert_eq!(record["source"], "chat");
    }

    #[tokio::test]
    async fn test_merge_fragment_persists_and_reports_skips() {
        let (service, _, store) = service();
        let fragment: MemoryFragment = serde_json::from_str(
            r#"{"interests":["gardening","gardening"],"medications":["not a record"]}"#,
        )
        .unwrap();

        let outcome = service.merge_fragment(&fragment).await.unwrap();
        assert_eq!(outcome.document.interests, vec!["gardening"]);
        assert_eq!(outcome.skipped.len(), 1);

        let document = store.0.memory.lock().unwrap().clone();
        assert_eq!(document.interests, vec!["gardening"]);
        assert!(document.last_updated.is_some());
    }
}
