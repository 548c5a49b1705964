//! Wire types for the Gemini `generateContent` API.

use serde::{Deserialize, Serialize};

/// One content block in a request: a role plus text parts.
#[derive(Debug, Clone, Serialize)]
pub(super) struct GeminiContent {
    pub role: &'static str,
    pub parts: Vec<GeminiRequestPart>,
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct GeminiRequestPart {
    pub text: String,
}

/// Sampling configuration, camelCased per the Gemini wire format.
#[derive(Debug, Clone, Serialize)]
pub(super) struct GeminiGenerationConfig {
    pub temperature: f64,
    #[serde(rename = "topK")]
    pub top_k: u32,
    #[serde(rename = "topP")]
    pub top_p: f64,
    #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GeminiGenerationConfig,
}

/// Response envelope; only the first candidate's first text part is used.
#[derive(Debug, Deserialize)]
pub(super) struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeminiCandidate {
    #[serde(default)]
    pub content: GeminiCandidateContent,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct GeminiCandidateContent {
    #[serde(default)]
    pub parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeminiResponsePart {
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiRequestPart {
                    text: "hello".to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.7,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 1024,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        let config = &json["generationConfig"];
        assert_eq!(config["topK"], 40);
        assert_eq!(config["topP"], 0.95);
        assert_eq!(config["maxOutputTokens"], 1024);
        assert_eq!(config["temperature"], 0.7);
    }

    #[test]
    fn test_response_parses_candidate_text() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"hi there"}],"role":"model"},"finishReason":"STOP"}]}"#;
        let response: GeminiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.candidates[0].content.parts[0].text, "hi there");
    }

    #[test]
    fn test_response_tolerates_empty_candidates() {
        let response: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(response.candidates.is_empty());
    }
}
