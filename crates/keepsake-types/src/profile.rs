//! Personal-record documents for Keepsake.
//!
//! These documents are owned by durable storage and loaded whole at session
//! bootstrap to prime the conversation: the user profile, daily routines,
//! family contacts, and freeform notes.
//!
//! Each struct keeps unrecognized fields in a flattened `extra` map so that
//! documents written by the frontend round-trip without loss.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::collections::BTreeMap;

/// The user profile document.
///
/// Flat object; the fields the core reads are typed, everything else the
/// frontend stores (preferences, emergency contacts, doctors) rides in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub medical_conditions: String,
    #[serde(default)]
    pub emergency_contact: String,
    #[serde(default)]
    pub hobbies: String,
    #[serde(default)]
    pub notes: String,
    /// BCP-47-ish language code driving the reply language, default "en".
    #[serde(default = "default_app_language")]
    pub app_language: String,
    #[serde(default)]
    pub languages_spoken: SpokenLanguages,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_app_language() -> String {
    "en".to_string()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: String::new(),
            gender: String::new(),
            medical_conditions: String::new(),
            emergency_contact: String::new(),
            hobbies: String::new(),
            notes: String::new(),
            app_language: default_app_language(),
            languages_spoken: SpokenLanguages::default(),
            extra: BTreeMap::new(),
        }
    }
}

/// Languages the user also speaks, accepted as a pre-split list or a
/// comma-separated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpokenLanguages {
    List(Vec<String>),
    Csv(String),
}

impl Default for SpokenLanguages {
    fn default() -> Self {
        SpokenLanguages::List(Vec::new())
    }
}

impl SpokenLanguages {
    /// Normalize to a list. CSV strings are split on commas with entries
    /// trimmed and empties dropped; lists pass through untouched.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            SpokenLanguages::List(list) => list.clone(),
            SpokenLanguages::Csv(csv) => csv
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// One entry in the routines document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub time: String,
    /// Day list or freeform text; rendered as-is into the priming context.
    #[serde(default)]
    pub days: Value,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One entry in the family document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub relation: String,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One entry in the notes document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: String,
}
