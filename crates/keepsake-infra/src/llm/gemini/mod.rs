//! Gemini generative backend.

mod client;
mod types;

pub use client::GeminiBackend;
