//! Shared domain types for Keepsake.
//!
//! This crate contains the core domain types used across the Keepsake
//! companion backend: conversation turns, the memory document and its
//! extracted fragments, personal-record documents, and their associated
//! error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod backend;
pub mod chat;
pub mod error;
pub mod memory;
pub mod profile;
