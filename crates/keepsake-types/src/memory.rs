//! Memory types for Keepsake.
//!
//! The [`MemoryDocument`] is the durable, category-typed store of everything
//! learned about the user across all sessions. It grows monotonically: items
//! are only ever added, never removed, so the companion never silently
//! forgets data extracted in a prior turn.
//!
//! A [`MemoryFragment`] is the per-turn structured data the generative
//! backend claims to have newly observed; the merge engine in keepsake-core
//! folds fragments into the document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A structured item in one of the record-holding categories.
///
/// Free-form JSON object; the only expectation is a human-readable
/// identifying field (e.g. `title` for saved memories).
pub type MemoryRecord = serde_json::Map<String, Value>;

/// Categories whose items are structured records rather than plain strings.
pub const RECORD_CATEGORIES: [&str; 3] = ["memories", "daily_routines", "medications"];

/// Categories whose items are plain strings, in document order.
pub const STRING_CATEGORIES: [&str; 12] = [
    "interests",
    "preferences",
    "people",
    "places",
    "life_roles",
    "values_beliefs",
    "emotional_patterns",
    "achievements",
    "challenges",
    "historical_events",
    "identity_details",
    "health_context",
];

/// The durable memory store, loaded and saved as a whole document.
///
/// Missing keys fill with defaults on load, so documents written by older
/// versions (or by hand) stay readable. Within any single category list no
/// two items are structurally equal; the merge engine enforces this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    #[serde(default)]
    pub memories: Vec<MemoryRecord>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub places: Vec<String>,
    #[serde(default)]
    pub life_roles: Vec<String>,
    #[serde(default)]
    pub daily_routines: Vec<MemoryRecord>,
    #[serde(default)]
    pub values_beliefs: Vec<String>,
    #[serde(default)]
    pub emotional_patterns: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub historical_events: Vec<String>,
    #[serde(default)]
    pub identity_details: Vec<String>,
    #[serde(default)]
    pub health_context: Vec<String>,
    #[serde(default)]
    pub medications: Vec<MemoryRecord>,
    /// Backend-proposed freeform categories, each an ordered list of values.
    #[serde(default)]
    pub adaptive_categories: BTreeMap<String, Vec<Value>>,
    /// Stamped on every save.
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl MemoryDocument {
    /// Stamp the document as updated at the given timestamp.
    pub fn touch(&mut self, timestamp: impl Into<String>) {
        self.last_updated = Some(timestamp.into());
    }

    /// The string-holding categories paired with their names, in
    /// [`STRING_CATEGORIES`] order.
    pub fn string_categories_mut(&mut self) -> [(&'static str, &mut Vec<String>); 12] {
        [
            ("interests", &mut self.interests),
            ("preferences", &mut self.preferences),
            ("people", &mut self.people),
            ("places", &mut self.places),
            ("life_roles", &mut self.life_roles),
            ("values_beliefs", &mut self.values_beliefs),
            ("emotional_patterns", &mut self.emotional_patterns),
            ("achievements", &mut self.achievements),
            ("challenges", &mut self.challenges),
            ("historical_events", &mut self.historical_events),
            ("identity_details", &mut self.identity_details),
            ("health_context", &mut self.health_context),
        ]
    }

    /// The record-holding categories paired with their names, in
    /// [`RECORD_CATEGORIES`] order.
    pub fn record_categories_mut(&mut self) -> [(&'static str, &mut Vec<MemoryRecord>); 3] {
        [
            ("memories", &mut self.memories),
            ("daily_routines", &mut self.daily_routines),
            ("medications", &mut self.medications),
        ]
    }
}

/// The structured data a single backend reply claims to have newly observed.
///
/// Every category holds raw JSON values because the backend is not trusted to
/// respect the per-category item shapes; the merge engine validates items one
/// by one. Unknown top-level keys are dropped at the decode boundary, and a
/// category that is present but not a list coerces to empty so one malformed
/// category never discards the rest of the fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryFragment {
    #[serde(default, deserialize_with = "items_or_empty")]
    pub memories: Vec<Value>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub interests: Vec<Value>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub preferences: Vec<Value>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub people: Vec<Value>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub places: Vec<Value>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub life_roles: Vec<Value>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub daily_routines: Vec<Value>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub values_beliefs: Vec<Value>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub emotional_patterns: Vec<Value>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub achievements: Vec<Value>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub challenges: Vec<Value>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub historical_events: Vec<Value>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub identity_details: Vec<Value>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub health_context: Vec<Value>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub medications: Vec<Value>,
    #[serde(default, deserialize_with = "adaptive_or_empty")]
    pub adaptive_categories: BTreeMap<String, AdaptiveValue>,
}

/// A category that is not a list coerces to empty.
fn items_or_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

/// An adaptive map that is not an object coerces to empty.
fn adaptive_or_empty<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, AdaptiveValue>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Value::Object(map) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(map
        .into_iter()
        .map(|(key, value)| {
            let adaptive = match value {
                Value::String(s) => AdaptiveValue::One(s),
                Value::Array(items) => AdaptiveValue::Many(items),
                other => AdaptiveValue::Other(other),
            };
            (key, adaptive)
        })
        .collect())
}

impl MemoryFragment {
    /// Whether the fragment carries no candidate items at all.
    pub fn is_empty(&self) -> bool {
        self.string_categories().iter().all(|(_, v)| v.is_empty())
            && self.record_categories().iter().all(|(_, v)| v.is_empty())
            && self.adaptive_categories.is_empty()
    }

    /// String-category candidates, in [`STRING_CATEGORIES`] order.
    pub fn string_categories(&self) -> [(&'static str, &[Value]); 12] {
        [
            ("interests", self.interests.as_slice()),
            ("preferences", self.preferences.as_slice()),
            ("people", self.people.as_slice()),
            ("places", self.places.as_slice()),
            ("life_roles", self.life_roles.as_slice()),
            ("values_beliefs", self.values_beliefs.as_slice()),
            ("emotional_patterns", self.emotional_patterns.as_slice()),
            ("achievements", self.achievements.as_slice()),
            ("challenges", self.challenges.as_slice()),
            ("historical_events", self.historical_events.as_slice()),
            ("identity_details", self.identity_details.as_slice()),
            ("health_context", self.health_context.as_slice()),
        ]
    }

    /// Record-category candidates, in [`RECORD_CATEGORIES`] order.
    pub fn record_categories(&self) -> [(&'static str, &[Value]); 3] {
        [
            ("memories", self.memories.as_slice()),
            ("daily_routines", self.daily_routines.as_slice()),
            ("medications", self.medications.as_slice()),
        ]
    }
}

/// Value of an adaptive category inside a fragment.
///
/// The backend may emit a bare string, a list of values, or (out of
/// contract) anything else; `Other` captures the rest so the merge engine
/// can ignore it without failing the whole decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdaptiveValue {
    One(String),
    Many(Vec<Value>),
    Other(Value),
}

/// How a stored memory was referenced back to the user in a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfacingMode {
    Echo,
    SoftReminder,
    Invitation,
    #[serde(rename = "")]
    Empty,
}

impl fmt::Display for SurfacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfacingMode::Echo => write!(f, "echo"),
            SurfacingMode::SoftReminder => write!(f, "soft_reminder"),
            SurfacingMode::Invitation => write!(f, "invitation"),
            SurfacingMode::Empty => write!(f, ""),
        }
    }
}

impl FromStr for SurfacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "echo" => Ok(SurfacingMode::Echo),
            "soft_reminder" => Ok(SurfacingMode::SoftReminder),
            "invitation" => Ok(SurfacingMode::Invitation),
            "" => Ok(SurfacingMode::Empty),
            other => Err(format!("invalid surfacing mode: '{other}'")),
        }
    }
}

/// Per-turn metadata about memory resurfacing, as reported by the backend.
///
/// Fields stay raw strings on the wire; [`MemoryActions::mode`] parses the
/// surfacing mode, treating anything unrecognized as `Empty`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryActions {
    #[serde(default)]
    pub surfaced_memory: String,
    #[serde(default)]
    pub surfacing_mode: String,
    #[serde(default)]
    pub reason_for_surfacing: String,
}

impl MemoryActions {
    /// Whether no memory was surfaced this turn.
    pub fn is_empty(&self) -> bool {
        self.surfaced_memory.is_empty()
    }

    /// The surfacing mode, `Empty` when absent or unrecognized.
    pub fn mode(&self) -> SurfacingMode {
        self.surfacing_mode.parse().unwrap_or(SurfacingMode::Empty)
    }
}

/// A memory-confirmation proposal produced when the double-mention rule
/// fires and the backend complies.
///
/// Transient: persistence only happens through an explicit confirm action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmProposal {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// A memory record persisted from a confirm action.
///
/// Lives in the `memories` category of the document. Wire field names match
/// the document format (`mediaPath`, `chatRef`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMemory {
    pub id: String,
    pub title: String,
    pub date: String,
    pub description: String,
    #[serde(rename = "mediaPath")]
    pub media_path: Option<String>,
    pub source: String,
    #[serde(rename = "chatRef")]
    pub chat_ref: Option<String>,
}
