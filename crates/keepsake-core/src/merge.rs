//! Folding extracted fragments into the durable memory document.
//!
//! The merge is additive and monotonic: items are appended when not already
//! present (structural equality), never removed or reordered. The store must
//! not forget data the backend extracted in a prior turn, even if the same
//! backend later fails to re-extract it.
//!
//! Candidate items are validated per category: the record categories
//! (`memories`, `daily_routines`, `medications`) accept only JSON objects,
//! the string categories only strings. What happens to an invalid item
//! depends on [`MergeStrictness`].

use serde::Serialize;
use serde_json::Value;

use keepsake_types::error::MergeError;
use keepsake_types::memory::{AdaptiveValue, MemoryDocument, MemoryFragment};

/// How the merge treats items of the wrong shape for their category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrictness {
    /// Skip the item, log it, and keep merging (the default behavior).
    Lenient,
    /// Fail the whole merge on the first invalid item.
    Strict,
}

/// Expected item shape for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemShape {
    Text,
    Record,
}

impl ItemShape {
    fn describe(self) -> &'static str {
        match self {
            ItemShape::Text => "a string",
            ItemShape::Record => "a structured record",
        }
    }
}

/// One candidate item dropped during a lenient merge.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedItem {
    pub category: &'static str,
    pub value: Value,
    pub expected: ItemShape,
}

/// Result of a merge: the updated document plus skipped-item diagnostics.
///
/// The caller decides whether to surface the diagnostics; persisting the
/// document is also the caller's job.
#[derive(Debug)]
pub struct MergeOutcome {
    pub document: MemoryDocument,
    pub skipped: Vec<SkippedItem>,
}

/// Merge a fragment into a document.
///
/// Falsy candidates (null, false, zero, empty string/array/object) are
/// dropped silently in every mode. Adaptive-category values merge with no
/// item-level validation: a string appends if unique, a list appends each
/// contained item if unique, any other shape is ignored.
pub fn merge(
    document: MemoryDocument,
    fragment: &MemoryFragment,
    strictness: MergeStrictness,
) -> Result<MergeOutcome, MergeError> {
    let mut document = document;
    let mut skipped = Vec::new();

    for ((name, target), (_, candidates)) in document
        .string_categories_mut()
        .into_iter()
        .zip(fragment.string_categories())
    {
        for candidate in candidates {
            if is_falsy(candidate) {
                continue;
            }
            match candidate.as_str() {
                Some(text) => {
                    if !target.iter().any(|existing| existing == text) {
                        target.push(text.to_string());
                    }
                }
                None => reject(name, candidate, ItemShape::Text, strictness, &mut skipped)?,
            }
        }
    }

    for ((name, target), (_, candidates)) in document
        .record_categories_mut()
        .into_iter()
        .zip(fragment.record_categories())
    {
        for candidate in candidates {
            if is_falsy(candidate) {
                continue;
            }
            match candidate.as_object() {
                Some(record) => {
                    if !target.iter().any(|existing| existing == record) {
                        target.push(record.clone());
                    }
                }
                None => reject(name, candidate, ItemShape::Record, strictness, &mut skipped)?,
            }
        }
    }

    for (key, value) in &fragment.adaptive_categories {
        let target = document.adaptive_categories.entry(key.clone()).or_default();
        match value {
            AdaptiveValue::One(text) => {
                let item = Value::String(text.clone());
                if !target.contains(&item) {
                    target.push(item);
                }
            }
            AdaptiveValue::Many(items) => {
                for item in items {
                    if !target.contains(item) {
                        target.push(item.clone());
                    }
                }
            }
            AdaptiveValue::Other(other) => {
                tracing::debug!(category = %key, value = %other, "ignoring adaptive value of unsupported shape");
            }
        }
    }

    Ok(MergeOutcome { document, skipped })
}

fn reject(
    category: &'static str,
    candidate: &Value,
    expected: ItemShape,
    strictness: MergeStrictness,
    skipped: &mut Vec<SkippedItem>,
) -> Result<(), MergeError> {
    match strictness {
        MergeStrictness::Strict => Err(MergeError::InvalidItem {
            category: category.to_string(),
            expected: expected.describe(),
        }),
        MergeStrictness::Lenient => {
            tracing::warn!(
                category,
                value = %candidate,
                expected = expected.describe(),
                "skipping invalid item during merge"
            );
            skipped.push(SkippedItem {
                category,
                value: candidate.clone(),
                expected,
            });
            Ok(())
        }
    }
}

/// Python-style truthiness test on JSON values; falsy candidates never merge.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
