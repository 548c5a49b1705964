//! Candidate-topic extraction from raw utterances.
//!
//! Feeds the mention tracker: lowercase, split on whitespace, strip edge
//! punctuation, keep words longer than four characters that are not
//! stopwords. No stemming and no in-turn deduplication -- duplicate tokens
//! in one utterance are harmless because the counter increments once per
//! occurrence.

/// Common function words that never count as topics.
const STOPWORDS: [&str; 23] = [
    "that", "this", "with", "have", "from", "they", "were", "been", "would", "could", "should",
    "about", "when", "what", "just", "there", "their", "then", "than", "will", "some", "also",
    "which",
];

/// Punctuation stripped from both ends of each token.
const TOKEN_TRIM: &[char] = &['.', ',', '!', '?', '"', '\''];

/// Extract candidate topic tokens from an utterance, in utterance order.
///
/// Pure function; the caller decides what to do with repeats.
pub fn extract_keywords(utterance: &str) -> Vec<String> {
    utterance
        .to_lowercase()
        .split_whitespace()
        .map(|word| word.trim_matches(TOKEN_TRIM))
        .filter(|word| word.chars().count() > 4 && !STOPWORDS.contains(word))
        .map(str::to_string)
        .collect()
}
