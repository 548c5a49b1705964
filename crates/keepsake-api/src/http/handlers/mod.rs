//! Request handlers, one module per resource.

pub mod chat;
pub mod family;
pub mod memory;
pub mod note;
pub mod profile;
pub mod routine;
pub mod upload;
