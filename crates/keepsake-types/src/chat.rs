//! Conversation types for Keepsake.
//!
//! A session's conversation is an ordered list of [`Turn`]s. The turn list is
//! the authoritative history sent verbatim to the generative backend on every
//! chat call. The durable chat log persisted across sessions uses
//! [`ChatEntry`] records instead.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Role of a turn in a session conversation.
///
/// `Priming` marks the instruction turn seeded at session bootstrap; on the
/// backend wire it is sent with the `user` role, but keeping it distinct lets
/// callers tell bootstrap content apart from real user utterances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
    Priming,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Model => write!(f, "model"),
            TurnRole::Priming => write!(f, "priming"),
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TurnRole::User),
            "model" => Ok(TurnRole::Model),
            "priming" => Ok(TurnRole::Priming),
            other => Err(format!("invalid turn role: '{other}'")),
        }
    }
}

/// One message in a session conversation. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }

    pub fn priming(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Priming,
            text: text.into(),
        }
    }
}

/// One entry in the durable chat log document.
///
/// Append-only from the core's perspective. The `id` lets chat-derived
/// memories reference the exact exchange they came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub content: String,
}
