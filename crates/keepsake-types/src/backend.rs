//! Generative backend request types for Keepsake.
//!
//! The backend is an opaque collaborator: ordered conversation turns plus
//! fixed generation parameters in, free text (usually carrying an embedded
//! JSON object) out. Concrete implementations live in keepsake-infra.

use serde::{Deserialize, Serialize};

/// Fixed sampling parameters sent with every generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

/// Errors from generative backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(String),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend reply missing candidate text")]
    EmptyReply,

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_params_defaults() {
        let params = GenerationParams::default();
        assert!((params.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(params.top_k, 40);
        assert!((params.top_p - 0.95).abs() < f64::EPSILON);
        assert_eq!(params.max_output_tokens, 1024);
    }

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Status {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("overloaded"));
    }
}
