//! Per-session topic mention counting for the double-mention rule.
//!
//! A topic token is flagged the first time its count reaches two within a
//! session. Flagging is one-shot: the `prompted` flag is set at most once per
//! token per session lifetime and never reset, so the save-as-memory prompt
//! fires exactly once per topic.

use std::collections::HashMap;

/// Counter state for one topic token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionEntry {
    pub count: u32,
    pub prompted: bool,
}

/// Mention counters for a single session.
#[derive(Debug, Default)]
pub struct MentionTable {
    entries: HashMap<String, MentionEntry>,
}

impl MentionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one turn's tokens, in utterance order.
    ///
    /// Returns the single topic flagged this turn, if any: the first token
    /// whose count newly reaches two with `prompted` still false. Processing
    /// stops at the flagged token, so later qualifying tokens wait for a
    /// future turn.
    pub fn record(&mut self, tokens: &[String]) -> Option<String> {
        for token in tokens {
            match self.entries.get_mut(token) {
                None => {
                    self.entries.insert(
                        token.clone(),
                        MentionEntry {
                            count: 1,
                            prompted: false,
                        },
                    );
                }
                Some(entry) => {
                    entry.count += 1;
                    if entry.count >= 2 && !entry.prompted {
                        entry.prompted = true;
                        return Some(token.clone());
                    }
                }
            }
        }
        None
    }

    /// Counter state for a token, if it has been seen.
    pub fn get(&self, token: &str) -> Option<&MentionEntry> {
        self.entries.get(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_first_mention_not_flagged() {
        let mut table = MentionTable::new();
        assert_eq!(table.record(&tokens(&["garden"])), None);
        assert_eq!(table.get("garden").unwrap().count, 1);
        assert!(!table.get("garden").unwrap().prompted);
    }

    #[test]
    fn test_second_mention_flagged_once() {
        let mut table = MentionTable::new();
        assert_eq!(table.record(&tokens(&["garden"])), None);
        assert_eq!(table.record(&tokens(&["garden"])), Some("garden".to_string()));

        // Third and later mentions never flag again.
        assert_eq!(table.record(&tokens(&["garden"])), None);
        assert_eq!(table.record(&tokens(&["garden"])), None);
        assert_eq!(table.get("garden").unwrap().count, 4);
        assert!(table.get("garden").unwrap().prompted);
    }

    #[test]
    fn test_first_qualifying_token_wins() {
        let mut table = MentionTable::new();
        table.record(&tokens(&["roses", "tulips"]));
        // Both qualify this turn; utterance order decides.
        let flagged = table.record(&tokens(&["roses", "tulips"]));
        assert_eq!(flagged, Some("roses".to_string()));
        // Processing stopped at "roses", so "tulips" stayed at count 1.
        assert_eq!(table.get("tulips").unwrap().count, 1);

        // "tulips" fires on the next turn instead.
        let flagged = table.record(&tokens(&["tulips"]));
        assert_eq!(flagged, Some("tulips".to_string()));
    }

    #[test]
    fn test_in_turn_duplicate_counts_and_flags() {
        let mut table = MentionTable::new();
        let flagged = table.record(&tokens(&["garden", "garden"]));
        assert_eq!(flagged, Some("garden".to_string()));
        assert_eq!(table.get("garden").unwrap().count, 2);
    }

    #[test]
    fn test_distinct_tokens_tracked_separately() {
        let mut table = MentionTable::new();
        // "gardening", "garden", "gardens" are token-literal: no stemming.
        assert_eq!(table.record(&tokens(&["gardening"])), None);
        assert_eq!(table.record(&tokens(&["garden"])), None);
        assert_eq!(table.record(&tokens(&["gardens"])), None);
        assert_eq!(table.len(), 3);
    }
}
