//! Decoding the structured reply embedded in backend free text.
//!
//! The backend is instructed to answer with a single JSON object, but in
//! practice wraps it in prose or markdown fences. The decode contract is the
//! substring between the first `{` and the last `}`; anything less than a
//! parsable object there degrades to treating the whole reply as
//! conversational text. Degradation is silent -- logged, never raised.

use serde_json::Value;

use keepsake_types::memory::{ConfirmProposal, MemoryActions, MemoryFragment};

/// Successfully decoded reply fields.
#[derive(Debug, Clone, Default)]
pub struct ParsedReply {
    /// Conversational text; falls back to the raw reply when the `response`
    /// field is absent.
    pub response: String,
    pub extracted: MemoryFragment,
    pub actions: MemoryActions,
    pub confirm: Option<ConfirmProposal>,
}

/// Outcome of decoding one backend reply.
#[derive(Debug, Clone)]
pub enum ReplyOutcome {
    Parsed(ParsedReply),
    /// No parsable object found; the raw text is the conversational reply.
    Unparsable { raw: String },
}

impl ReplyOutcome {
    /// Flatten into the per-turn result tuple: conversational text,
    /// extracted fragment, surfacing metadata, confirmation proposal.
    pub fn into_parts(
        self,
    ) -> (
        String,
        MemoryFragment,
        MemoryActions,
        Option<ConfirmProposal>,
    ) {
        match self {
            ReplyOutcome::Parsed(parsed) => (
                parsed.response,
                parsed.extracted,
                parsed.actions,
                parsed.confirm,
            ),
            ReplyOutcome::Unparsable { raw } => (
                raw,
                MemoryFragment::default(),
                MemoryActions::default(),
                None,
            ),
        }
    }
}

/// Decode the embedded JSON object from a raw backend reply.
pub fn interpret(raw: &str) -> ReplyOutcome {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return ReplyOutcome::Unparsable {
            raw: raw.to_string(),
        };
    };
    if start >= end {
        return ReplyOutcome::Unparsable {
            raw: raw.to_string(),
        };
    }

    let candidate = &raw[start..=end];
    let object: Value = match serde_json::from_str(candidate) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(%error, "unparsable reply object; falling back to raw text");
            return ReplyOutcome::Unparsable {
                raw: raw.to_string(),
            };
        }
    };

    let response = object
        .get("response")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| raw.to_string());

    let extracted = object
        .get("extracted_data")
        .cloned()
        .map(|value| {
            serde_json::from_value(value).unwrap_or_else(|error| {
                tracing::warn!(%error, "malformed extracted_data; using empty fragment");
                MemoryFragment::default()
            })
        })
        .unwrap_or_default();

    let actions = object
        .get("memory_actions")
        .cloned()
        .map(|value| {
            serde_json::from_value(value).unwrap_or_else(|error| {
                tracing::warn!(%error, "malformed memory_actions; ignoring");
                MemoryActions::default()
            })
        })
        .unwrap_or_default();

    let confirm = object
        .get("memory_to_confirm")
        .and_then(parse_confirm_proposal);

    ReplyOutcome::Parsed(ParsedReply {
        response,
        extracted,
        actions,
        confirm,
    })
}

/// A confirmation proposal counts only as a structured object with a
/// non-empty `title`; explicit nulls and malformed stubs are discarded.
fn parse_confirm_proposal(value: &Value) -> Option<ConfirmProposal> {
    let object = value.as_object()?;
    let title = object.get("title")?.as_str()?;
    if title.is_empty() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(proposal) => Some(proposal),
        Err(error) => {
            tracing::warn!(%error, "malformed memory_to_confirm; ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(raw: &str) -> (String, MemoryFragment, MemoryActions, Option<ConfirmProposal>) {
        interpret(raw).into_parts()
    }

    #[test]
    fn test_embedded_object_with_surrounding_prose() {
        let raw = r#"preamble {"response":"hi","extracted_data":{}} trailing"#;
        let (text, fragment, _, confirm) = parts(raw);
        assert_eq!(text, "hi");
        assert_eq!(fragment, MemoryFragment::default());
        assert!(confirm.is_none());
    }

    #[test]
    fn test_no_braces_falls_back_to_raw() {
        let raw = "Just a plain warm reply with no structure.";
        let (text, fragment, actions, confirm) = parts(raw);
        assert_eq!(text, raw);
        assert!(fragment.is_empty());
        assert!(actions.is_empty());
        assert!(confirm.is_none());
    }

    #[test]
    fn test_reversed_braces_fall_back() {
        let raw = "} not a json object {";
        let (text, fragment, _, _) = parts(raw);
        assert_eq!(text, raw);
        assert!(fragment.is_empty());
    }

    #[test]
    fn test_unparsable_object_falls_back() {
        let raw = "prefix {not valid json} suffix";
        let (text, fragment, _, _) = parts(raw);
        assert_eq!(text, raw);
        assert!(fragment.is_empty());
    }

    #[test]
    fn test_missing_response_defaults_to_raw() {
        let raw = r#"{"extracted_data":{"interests":["birds"]}}"#;
        let (text, fragment, _, _) = parts(raw);
        assert_eq!(text, raw);
        assert_eq!(fragment.interests.len(), 1);
    }

    #[test]
    fn test_markdown_fenced_object() {
        let raw = "```json\n{\"response\":\"Good morning!\",\"extracted_data\":{}}\n```";
        let (text, _, _, _) = parts(raw);
        assert_eq!(text, "Good morning!");
    }

    #[test]
    fn test_confirm_proposal_requires_non_empty_title() {
        let with_title = r#"{"response":"x","memory_to_confirm":{"title":"The red hat","description":"d","date":null}}"#;
        let (_, _, _, confirm) = parts(with_title);
        let proposal = confirm.unwrap();
        assert_eq!(proposal.title, "The red hat");
        assert!(proposal.date.is_none());

        let empty_title = r#"{"response":"x","memory_to_confirm":{"title":""}}"#;
        assert!(parts(empty_title).3.is_none());

        let explicit_null = r#"{"response":"x","memory_to_confirm":null}"#;
        assert!(parts(explicit_null).3.is_none());

        let not_an_object = r#"{"response":"x","memory_to_confirm":"save it"}"#;
        assert!(parts(not_an_object).3.is_none());
    }

    #[test]
    fn test_memory_actions_pass_through() {
        let raw = r#"{"response":"x","memory_actions":{"surfaced_memory":"Summer vacay","surfacing_mode":"soft_reminder","reason_for_surfacing":"topic aligned"}}"#;
        let (_, _, actions, _) = parts(raw);
        assert_eq!(actions.surfaced_memory, "Summer vacay");
        assert_eq!(
            actions.mode(),
            keepsake_types::memory::SurfacingMode::SoftReminder
        );
    }

    #[test]
    fn test_malformed_extracted_data_degrades_to_empty() {
        let raw = r#"{"response":"x","extracted_data":"not an object"}"#;
        let (text, fragment, _, _) = parts(raw);
        assert_eq!(text, "x");
        assert!(fragment.is_empty());
    }
}
