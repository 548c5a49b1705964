//! GeminiBackend -- concrete [`GenerativeBackend`] implementation.
//!
//! Sends the full conversation to the Gemini `generateContent` endpoint in a
//! single blocking round-trip, no retry. Priming turns travel with the
//! `user` role on the wire; the backend only knows `user` and `model`.
//!
//! The API key is wrapped in [`secrecy::SecretString`]. It rides in the
//! request URL as the `key` query parameter, so the URL itself is never
//! logged.

use secrecy::{ExposeSecret, SecretString};

use keepsake_core::backend::GenerativeBackend;
use keepsake_types::backend::{BackendError, GenerationParams};
use keepsake_types::chat::{Turn, TurnRole};

use super::types::{
    GeminiContent, GeminiGenerationConfig, GeminiRequest, GeminiRequestPart, GeminiResponse,
};

/// Gemini generative backend.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiBackend {
    /// Default model identifier.
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash-lite";

    pub fn new(api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            self.api_key.expose_secret()
        )
    }

    fn to_request(turns: &[Turn], params: &GenerationParams) -> GeminiRequest {
        let contents = turns
            .iter()
            .map(|turn| GeminiContent {
                role: match turn.role {
                    TurnRole::User | TurnRole::Priming => "user",
                    TurnRole::Model => "model",
                },
                parts: vec![GeminiRequestPart {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        GeminiRequest {
            contents,
            generation_config: GeminiGenerationConfig {
                temperature: params.temperature,
                top_k: params.top_k,
                top_p: params.top_p,
                max_output_tokens: params.max_output_tokens,
            },
        }
    }
}

// GeminiBackend intentionally does not derive Debug: the URL builder embeds
// the API key, and omitting Debug keeps the struct out of format strings.

impl GenerativeBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        turns: &[Turn],
        params: &GenerationParams,
    ) -> Result<String, BackendError> {
        let body = Self::to_request(turns, params);

        let response = self
            .client
            .post(self.url())
            .json(&body)
            .send()
            .await
            .map_err(|error| BackendError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "generative backend returned an error");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: error_body,
            });
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|error| BackendError::Deserialization(error.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(BackendError::EmptyReply)
    }
}
