//! Business logic for the Keepsake companion backend.
//!
//! The session context/state engine lives here: keyword extraction and the
//! double-mention rule, per-session conversation assembly, interpretation of
//! backend replies, and the merge engine that folds extracted fragments into
//! the durable memory document.
//!
//! Infrastructure (file storage, the Gemini HTTP client) is kept behind the
//! [`store::RecordStore`] and [`backend::GenerativeBackend`] traits so this
//! crate never depends on keepsake-infra.

pub mod backend;
pub mod companion;
pub mod context;
pub mod interpret;
pub mod keyword;
pub mod mention;
pub mod merge;
pub mod prompt;
pub mod session;
pub mod store;
