//! Session bootstrap: assembling the priming turn pair.
//!
//! On the first chat call of a session, the caller loads the personal-record
//! documents and hands them here. The result is one priming instruction turn
//! carrying the behavioral instructions, the derived language policy, the
//! current wall-clock time, and formatted context sections, followed by one
//! model acknowledgement turn. The pair seeds the conversation exactly once
//! per session.

use chrono::NaiveDateTime;
use serde_json::Value;

use keepsake_types::chat::{ChatEntry, Turn};
use keepsake_types::memory::{MemoryDocument, MemoryRecord};
use keepsake_types::profile::{FamilyMember, Profile, Routine};

use crate::prompt;

/// How many chat-log entries the recap section includes.
pub const CHAT_RECAP_LIMIT: usize = 10;

/// Everything the assembler needs, loaded by the caller from storage.
pub struct PrimingInputs<'a> {
    pub profile: &'a Profile,
    pub routines: &'a [Routine],
    pub memory: &'a MemoryDocument,
    pub family: &'a [FamilyMember],
    pub chat_log: &'a [ChatEntry],
}

/// Build the priming instruction turn and the model acknowledgement turn.
pub fn build_priming_turns(inputs: &PrimingInputs<'_>, now: NaiveDateTime) -> (Turn, Turn) {
    let code = inputs.profile.app_language.as_str();
    let primary = prompt::language_name(code).to_string();
    let spoken = inputs.profile.languages_spoken.to_list();
    let spoken_list = if spoken.is_empty() {
        primary.clone()
    } else {
        spoken.join(", ")
    };

    let language_block = prompt::language_instructions(&primary, code, &spoken_list);
    let full_context = format_context_sections(inputs);

    let priming_text = format!(
        "{}{}\n\nENVIRONMENT CONTEXT:\nCurrent Time: {}\n\n{}",
        prompt::SYSTEM_PROMPT,
        language_block,
        now.format("%Y-%m-%d %H:%M"),
        full_context,
    );

    (
        Turn::priming(priming_text),
        Turn::model(prompt::acknowledgement(&primary, &spoken_list)),
    )
}

/// Format the personal-context sections, separated by blank lines.
///
/// The profile section is always present; sections for empty collections are
/// omitted entirely.
fn format_context_sections(inputs: &PrimingInputs<'_>) -> String {
    let mut sections: Vec<String> = Vec::new();

    let profile = inputs.profile;
    let mut profile_text = String::from("USER PROFILE:\n");
    if !profile.name.is_empty() {
        profile_text.push_str(&format!("- Name: {}\n", profile.name));
    }
    if !profile.age.is_empty() {
        profile_text.push_str(&format!("- Age: {}\n", profile.age));
    }
    if !profile.medical_conditions.is_empty() {
        profile_text.push_str(&format!("- Medical Context: {}\n", profile.medical_conditions));
    }
    if !profile.hobbies.is_empty() {
        profile_text.push_str(&format!("- Interests: {}\n", profile.hobbies));
    }
    sections.push(profile_text);

    if !inputs.routines.is_empty() {
        let mut text = String::from("CURRENT ROUTINES:\n");
        for routine in inputs.routines {
            text.push_str(&format!(
                "- {} at {} ({})\n",
                routine.title,
                routine.time,
                render_days(&routine.days)
            ));
        }
        sections.push(text);
    }

    if !inputs.memory.memories.is_empty() {
        let mut text = String::from("STORED MEMORIES:\n");
        for record in &inputs.memory.memories {
            text.push_str(&format!(
                "- {}: {}\n",
                record_field(record, "title"),
                record_field(record, "description")
            ));
        }
        sections.push(text);
    }

    if !inputs.family.is_empty() {
        let mut text = String::from("FAMILY & CONTACTS:\n");
        for member in inputs.family {
            text.push_str(&format!("- {} ({})", member.name, member.relation));
            if let Some(birthday) = member.birthday.as_deref().filter(|b| !b.is_empty()) {
                text.push_str(&format!(" - Birthday: {birthday}"));
            }
            text.push('\n');
        }
        sections.push(text);
    }

    if !inputs.chat_log.is_empty() {
        let mut text = String::from("PAST CONVERSATIONS (RECAP):\n");
        let tail_start = inputs.chat_log.len().saturating_sub(CHAT_RECAP_LIMIT);
        for entry in &inputs.chat_log[tail_start..] {
            text.push_str(&format!(
                "[{}] {}: {}\n",
                entry.timestamp, entry.sender, entry.content
            ));
        }
        sections.push(text);
    }

    sections.join("\n\n")
}

/// Render a record field for the context; non-string values keep their JSON
/// form, missing fields render empty.
fn record_field(record: &MemoryRecord, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Render the `days` field of a routine: strings pass through, lists join
/// with commas, anything else keeps its JSON form.
fn render_days(days: &Value) -> String {
    match days {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use keepsake_types::profile::SpokenLanguages;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn empty_inputs<'a>(
        profile: &'a Profile,
        memory: &'a MemoryDocument,
    ) -> PrimingInputs<'a> {
        PrimingInputs {
            profile,
            routines: &[],
            memory,
            family: &[],
            chat_log: &[],
        }
    }

    #[test]
    fn test_priming_contains_time_and_language_policy() {
        let profile = Profile::default();
        let memory = MemoryDocument::default();
        let (priming, ack) = build_priming_turns(&empty_inputs(&profile, &memory), fixed_now());

        assert!(priming.text.contains("Current Time: 2026-08-05 14:30"));
        assert!(priming.text.contains("Primary App Language: English (code: en)"));
        assert!(ack.text.contains("respond primarily in English"));
    }

    #[test]
    fn test_empty_collections_omit_sections() {
        let profile = Profile::default();
        let memory = MemoryDocument::default();
        let (priming, _) = build_priming_turns(&empty_inputs(&profile, &memory), fixed_now());

        // Profile header is always present; the rest only when populated.
        assert!(priming.text.contains("USER PROFILE:"));
        assert!(!priming.text.contains("CURRENT ROUTINES:"));
        assert!(!priming.text.contains("STORED MEMORIES:"));
        assert!(!priming.text.contains("FAMILY & CONTACTS:"));
        assert!(!priming.text.contains("PAST CONVERSATIONS (RECAP):"));
    }

    #[test]
    fn test_profile_and_family_formatting() {
        let profile = Profile {
            name: "Rose".into(),
            age: "82".into(),
            medical_conditions: "arthritis".into(),
            hobbies: "gardening".into(),
            ..Profile::default()
        };
        let memory = MemoryDocument::default();
        let family = vec![
            FamilyMember {
                name: "Ana".into(),
                relation: "daughter".into(),
                birthday: Some("May 3".into()),
                ..FamilyMember::default()
            },
            FamilyMember {
                name: "Leo".into(),
                relation: "grandson".into(),
                ..FamilyMember::default()
            },
        ];
        let inputs = PrimingInputs {
            profile: &profile,
            routines: &[],
            memory: &memory,
            family: &family,
            chat_log: &[],
        };
        let (priming, _) = build_priming_turns(&inputs, fixed_now());

        assert!(priming.text.contains("- Name: Rose\n"));
        assert!(priming.text.contains("- Age: 82\n"));
        assert!(priming.text.contains("- Medical Context: arthritis\n"));
        assert!(priming.text.contains("- Interests: gardening\n"));
        assert!(priming.text.contains("- Ana (daughter) - Birthday: May 3\n"));
        // No birthday clause when absent.
        assert!(priming.text.contains("- Leo (grandson)\n"));
    }

    #[test]
    fn test_routines_and_memories_formatting() {
        let profile = Profile::default();
        let mut memory = MemoryDocument::default();
        let mut record = MemoryRecord::new();
        record.insert("title".into(), Value::String("Summer vacay".into()));
        record.insert(
            "description".into(),
            Value::String("Stayed at a hotel by the sea".into()),
        );
        memory.memories.push(record);

        let routines = vec![Routine {
            title: "Tea".into(),
            time: "16:00".into(),
            days: serde_json::json!(["Mon", "Wed"]),
            ..Routine::default()
        }];
        let inputs = PrimingInputs {
            profile: &profile,
            routines: &routines,
            memory: &memory,
            family: &[],
            chat_log: &[],
        };
        let (priming, _) = build_priming_turns(&inputs, fixed_now());

        assert!(priming.text.contains("- Tea at 16:00 (Mon, Wed)\n"));
        assert!(priming.text.contains("- Summer vacay: Stayed at a hotel by the sea\n"));
    }

    #[test]
    fn test_chat_recap_keeps_last_ten() {
        let profile = Profile::default();
        let memory = MemoryDocument::default();
        let chat_log: Vec<ChatEntry> = (0..15)
            .map(|i| ChatEntry {
                id: i.to_string(),
                timestamp: format!("t{i}"),
                sender: "User".into(),
                content: format!("message {i}"),
            })
            .collect();
        let inputs = PrimingInputs {
            profile: &profile,
            routines: &[],
            memory: &memory,
            family: &[],
            chat_log: &chat_log,
        };
        let (priming, _) = build_priming_turns(&inputs, fixed_now());

        assert!(!priming.text.contains("message 4"));
        assert!(priming.text.contains("message 5"));
        assert!(priming.text.contains("message 14"));
    }

    #[test]
    fn test_spoken_languages_drive_policy() {
        let profile = Profile {
            app_language: "fr".into(),
            languages_spoken: SpokenLanguages::Csv("French, English".into()),
            ..Profile::default()
        };
        let memory = MemoryDocument::default();
        let (priming, ack) = build_priming_turns(&empty_inputs(&profile, &memory), fixed_now());

        assert!(priming.text.contains("Primary App Language: French (code: fr)"));
        assert!(priming.text.contains("French, English"));
        assert!(ack.text.contains("if you speak in French, English"));
    }

    #[test]
    fn test_unknown_language_code_passes_through() {
        let profile = Profile {
            app_language: "tlh".into(),
            ..Profile::default()
        };
        let memory = MemoryDocument::default();
        let (priming, _) = build_priming_turns(&empty_inputs(&profile, &memory), fixed_now());
        assert!(priming.text.contains("Primary App Language: tlh (code: tlh)"));
    }
}
