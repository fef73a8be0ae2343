//! Signal extraction from raw query text.
//!
//! Produces a [`QuerySignals`] value once per query via case-insensitive
//! marker checks plus two structural heuristics: numbered-list /
//! multi-question detection for multi-part queries, and a proper-noun-like
//! scan for references to multiple distinct sources.

use super::vocabulary::Vocabulary;
use std::collections::HashSet;

/// Distinct source-like references required before the multi-source
/// signal fires.
const MULTI_SOURCE_MIN: usize = 2;

/// Question marks required before the multi-question heuristic fires.
const MULTI_QUESTION_MIN: usize = 2;

/// Numbered list items required before the enumeration heuristic fires.
const NUMBERED_ITEMS_MIN: usize = 2;

/// The per-query signal breakdown feeding the complexity score.
///
/// Derived exactly once per query and immutable thereafter; retained on
/// [`ComplexityResult`](super::ComplexityResult) for explainability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySignals {
    /// The original query text, unmodified.
    pub raw_text: String,
    /// Whitespace-delimited word count.
    pub token_count: usize,
    /// Comparison vocabulary present ("compare", "versus", ...).
    pub has_comparison_markers: bool,
    /// Conjunction/enumeration structure present ("and also", numbered
    /// lists, multiple question marks).
    pub has_multi_part_markers: bool,
    /// Reasoning vocabulary present ("why", "analyze", "implications", ...).
    pub has_analytical_markers: bool,
    /// Two or more distinct proper-noun-like document references detected.
    pub mentions_multiple_sources: bool,
}

impl QuerySignals {
    /// Extract signals from raw query text.
    ///
    /// Pure and deterministic: same text and vocabulary, same signals.
    pub fn extract(query: &str, vocabulary: &Vocabulary) -> Self {
        let lower = query.to_lowercase();

        let has_multi_part_markers = Vocabulary::any_marker(&lower, &vocabulary.multi_part_markers)
            || numbered_items(query) >= NUMBERED_ITEMS_MIN
            || query.matches('?').count() >= MULTI_QUESTION_MIN;

        Self {
            raw_text: query.to_string(),
            token_count: query.split_whitespace().count(),
            has_comparison_markers: Vocabulary::any_marker(&lower, &vocabulary.comparison_markers),
            has_multi_part_markers,
            has_analytical_markers: Vocabulary::any_marker(
                &lower,
                &vocabulary.analytical_markers,
            ),
            mentions_multiple_sources: source_references(query).len() >= MULTI_SOURCE_MIN,
        }
    }
}

/// Count numbered list items ("1.", "2)", "10.") at line starts.
fn numbered_items(query: &str) -> usize {
    query
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            let digits: String = trimmed.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                return false;
            }
            matches!(trimmed[digits.len()..].chars().next(), Some('.') | Some(')'))
        })
        .count()
}

/// Collect distinct proper-noun-like index/document references.
///
/// Two shapes count as a reference:
/// - a token with an uppercase first letter and an uppercase letter or
///   digit later on ("Bylaws2025", "ByLaw2000"), and
/// - a run of two or more consecutive capitalized tokens
///   ("Annual Report"), collapsed into one reference.
///
/// References are deduplicated case-insensitively, so "Bylaws2025" and
/// "BYLAWS2025" count once.
fn source_references(query: &str) -> HashSet<String> {
    let tokens: Vec<&str> = query
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .collect();

    let mut refs = HashSet::new();
    let mut run: Vec<&str> = Vec::new();

    for &token in tokens.iter().chain(std::iter::once(&"")) {
        if is_capitalized(token) {
            run.push(token);
            continue;
        }
        flush_run(&run, &mut refs);
        run.clear();
    }

    refs
}

/// First character is an ASCII uppercase letter.
fn is_capitalized(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Inner uppercase letter or digit after the first character, e.g.
/// "Bylaws2025" or "ByLaw2000".
fn has_inner_marker(token: &str) -> bool {
    token
        .chars()
        .skip(1)
        .any(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Convert a run of consecutive capitalized tokens into references.
fn flush_run(run: &[&str], refs: &mut HashSet<String>) {
    match run {
        [] => {}
        [single] => {
            // A lone plain capitalized word is usually just sentence case;
            // only identifier-shaped tokens count.
            if has_inner_marker(single) {
                refs.insert(single.to_lowercase());
            }
        }
        many => {
            refs.insert(many.join(" ").to_lowercase());
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(query: &str) -> QuerySignals {
        QuerySignals::extract(query, &Vocabulary::default())
    }

    // -- token count -----------------------------------------------------

    #[test]
    fn test_token_count_whitespace_delimited() {
        assert_eq!(extract("What is the quorum requirement?").token_count, 5);
    }

    #[test]
    fn test_empty_query_all_signals_off() {
        let s = extract("");
        assert_eq!(s.token_count, 0);
        assert!(!s.has_comparison_markers);
        assert!(!s.has_multi_part_markers);
        assert!(!s.has_analytical_markers);
        assert!(!s.mentions_multiple_sources);
    }

    #[test]
    fn test_whitespace_only_query_all_signals_off() {
        let s = extract("   \n\t  ");
        assert_eq!(s.token_count, 0);
        assert!(!s.has_comparison_markers);
    }

    // -- comparison markers ----------------------------------------------

    #[test]
    fn test_comparison_marker_compare() {
        assert!(extract("Compare policy A with policy B").has_comparison_markers);
    }

    #[test]
    fn test_comparison_marker_vs_whole_word_only() {
        assert!(extract("apples vs oranges").has_comparison_markers);
        assert!(!extract("please investigate the outage").has_comparison_markers);
    }

    #[test]
    fn test_comparison_marker_difference_between() {
        assert!(extract("what is the difference between the two drafts").has_comparison_markers);
    }

    #[test]
    fn test_comparison_marker_case_insensitive() {
        assert!(extract("COMPARE the drafts").has_comparison_markers);
    }

    // -- multi-part markers ----------------------------------------------

    #[test]
    fn test_multi_part_and_also() {
        assert!(extract("summarize the budget and also list the risks").has_multi_part_markers);
    }

    #[test]
    fn test_multi_part_numbered_list() {
        let q = "Answer these:\n1. What changed?\n2. Who approved it?";
        assert!(extract(q).has_multi_part_markers);
    }

    #[test]
    fn test_multi_part_single_numbered_item_not_enough() {
        // One item and one question mark: neither structural heuristic fires,
        // and there is no conjunction.
        assert!(!extract("1. What changed?").has_multi_part_markers);
    }

    #[test]
    fn test_multi_part_multiple_question_marks() {
        assert!(extract("What changed? Who approved it?").has_multi_part_markers);
    }

    #[test]
    fn test_multi_part_paren_numbered_list() {
        let q = "1) first part\n2) second part";
        assert!(extract(q).has_multi_part_markers);
    }

    // -- analytical markers ----------------------------------------------

    #[test]
    fn test_analytical_marker_why() {
        assert!(extract("why did the vote fail").has_analytical_markers);
    }

    #[test]
    fn test_analytical_marker_implications() {
        assert!(extract("describe the implications of the change").has_analytical_markers);
    }

    #[test]
    fn test_analytical_marker_absent_for_lookup() {
        assert!(!extract("What is the quorum requirement?").has_analytical_markers);
    }

    // -- multi-source heuristic ------------------------------------------

    #[test]
    fn test_multi_source_two_identifier_tokens() {
        let s = extract("governance powers in Bylaws2025 versus ByLaw2000");
        assert!(s.mentions_multiple_sources);
    }

    #[test]
    fn test_multi_source_single_reference_not_enough() {
        assert!(!extract("what does Bylaws2025 say about quorum").mentions_multiple_sources);
    }

    #[test]
    fn test_multi_source_sentence_case_words_do_not_count() {
        // "What" and "Berlin" are plain capitalized words, not
        // identifier-shaped references.
        assert!(!extract("What is the population of Berlin").mentions_multiple_sources);
    }

    #[test]
    fn test_multi_source_multiword_proper_nouns() {
        let s = extract("cross-check the Annual Report against the Audit Summary");
        assert!(s.mentions_multiple_sources);
    }

    #[test]
    fn test_multi_source_dedup_case_insensitive() {
        // The same reference twice is still one source.
        assert!(!extract("search Bylaws2025 and BYLAWS2025").mentions_multiple_sources);
    }

    // -- numbered item counting ------------------------------------------

    #[test]
    fn test_numbered_items_double_digit() {
        assert_eq!(numbered_items("10. first\n11. second"), 2);
    }

    #[test]
    fn test_numbered_items_requires_delimiter() {
        assert_eq!(numbered_items("2024 was a good year\n2025 too"), 0);
    }

    // -- determinism -----------------------------------------------------

    #[test]
    fn test_extract_is_deterministic() {
        let q = "Compare Bylaws2025 versus ByLaw2000 and explain the implications";
        assert_eq!(extract(q), extract(q));
    }
}
