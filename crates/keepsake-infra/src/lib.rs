//! Infrastructure adapters for Keepsake.
//!
//! Concrete implementations of the keepsake-core traits: JSON-document file
//! storage and the Gemini generative backend, plus upload-blob storage and
//! data directory resolution.

pub mod llm;
pub mod storage;
