//! # Keyword Extraction Module
//!
//! ## Purpose
//! Turns free text into a small ordered set of salient terms for matching,
//! stripping function words and legal boilerplate.
//!
//! ## Input/Output Specification
//! - **Input**: Arbitrary text (a user query or a full page of act text) and
//!   an upper bound on output size
//! - **Output**: Deduplicated lowercase keywords in first-occurrence order,
//!   never longer than the bound
//!
//! ## Key Features
//! - ASCII-alphabetic tokenization, case-folded
//! - Fixed stop-word set covering function words and bare-act boilerplate
//! - Short tokens (length <= 3) discarded
//! - First-occurrence order preserved, duplicates removed
//!
//! An empty output means "no match possible": callers must short-circuit to
//! an empty result instead of scanning the corpus.

use regex::Regex;
use std::collections::HashSet;

/// Function words and legal boilerplate excluded from keyword sets.
/// Terms like "shall", "section", and "article" appear on nearly every page
/// of a bare act and would match the whole corpus.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "into", "have", "has", "shall", "will",
    "been", "were", "was", "are", "your", "you", "hereby", "such", "any", "other", "their",
    "thereof", "law", "section", "article", "acts",
];

/// Tokens shorter than this are noise ("of", "act", "the", initials).
const MIN_TOKEN_LENGTH: usize = 4;

/// Keyword extractor with a compiled token pattern and stop-word set.
///
/// Construct once and share; extraction itself is pure and deterministic.
pub struct KeywordExtractor {
    token_pattern: Regex,
    stop_words: HashSet<&'static str>,
}

impl KeywordExtractor {
    /// Create a new extractor
    pub fn new() -> Self {
        Self {
            // Maximal runs of ASCII letters; everything else is a separator.
            token_pattern: Regex::new(r"[A-Za-z]+").expect("valid token pattern"),
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Extract up to `max_count` keywords from `text`.
    ///
    /// Tokens are lowercased, filtered against the stop-word set and the
    /// minimum length, then deduplicated preserving the order in which each
    /// token first appears in the source text. Empty or all-stop-word input
    /// yields an empty set.
    pub fn extract(&self, text: &str, max_count: usize) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut seen = HashSet::new();
        let mut keywords = Vec::new();

        for mat in self.token_pattern.find_iter(&lowered) {
            if keywords.len() == max_count {
                break;
            }
            let token = mat.as_str();
            if token.len() < MIN_TOKEN_LENGTH || self.stop_words.contains(token) {
                continue;
            }
            if seen.insert(token.to_string()) {
                keywords.push(token.to_string());
            }
        }

        keywords
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> KeywordExtractor {
        KeywordExtractor::new()
    }

    #[test]
    fn extraction_is_deterministic() {
        let ex = extractor();
        let text = "What is the penalty for breach of contract under the IT Act?";
        assert_eq!(ex.extract(text, 5), ex.extract(text, 5));
    }

    #[test]
    fn respects_max_count() {
        let ex = extractor();
        let text = "penalty breach contract damages compensation tribunal appeal";
        for k in 0..6 {
            assert!(ex.extract(text, k).len() <= k);
        }
    }

    #[test]
    fn stop_words_never_appear() {
        let ex = extractor();
        // "shall" and "article" are long enough to survive the length filter
        // but must still be dropped.
        assert_eq!(ex.extract("shall shall article", 5), Vec::<String>::new());
        for text in ["the thereof hereby such", "section section section"] {
            assert!(ex.extract(text, 10).is_empty());
        }
    }

    #[test]
    fn short_tokens_are_dropped() {
        let ex = extractor();
        assert!(ex.extract("a an of to IT act", 5).is_empty());
    }

    #[test]
    fn dedup_preserves_first_occurrence_order() {
        let ex = extractor();
        assert_eq!(
            ex.extract("Contract contract breach breach damages", 5),
            vec!["contract", "breach", "damages"]
        );
    }

    #[test]
    fn empty_text_yields_empty_set() {
        let ex = extractor();
        assert!(ex.extract("", 5).is_empty());
        assert!(ex.extract("   \n\t", 5).is_empty());
    }

    #[test]
    fn tokenizes_on_non_alphabetic_runs() {
        let ex = extractor();
        assert_eq!(
            ex.extract("penalty-for-breach (Section 43A)", 5),
            vec!["penalty", "breach"]
        );
    }
}
