//! Application state wiring the companion service to its collaborators.
//!
//! The companion service is generic over backend and store traits; AppState
//! pins it to the concrete infra implementations (Gemini + JSON files).

use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;

use keepsake_core::companion::CompanionService;
use keepsake_infra::llm::gemini::GeminiBackend;
use keepsake_infra::storage::{JsonFileStore, resolve_data_dir};

/// Concrete companion service pinned to the infra implementations.
pub type ConcreteCompanionService = CompanionService<GeminiBackend, JsonFileStore>;

/// Shared application state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub companion: Arc<ConcreteCompanionService>,
    pub store: Arc<JsonFileStore>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: resolve the data dir, build the
    /// backend from the environment, wire the companion service.
    pub async fn init(data_dir_override: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = data_dir_override.unwrap_or_else(resolve_data_dir);
        tokio::fs::create_dir_all(&data_dir).await?;

        let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("GEMINI_API_KEY is not set; chat calls will fail");
        }
        let backend = GeminiBackend::new(SecretString::from(api_key));

        let companion = CompanionService::new(backend, JsonFileStore::new(&data_dir));

        Ok(Self {
            companion: Arc::new(companion),
            store: Arc::new(JsonFileStore::new(&data_dir)),
            data_dir,
        })
    }
}
