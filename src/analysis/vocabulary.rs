//! Marker vocabularies for the complexity heuristics.
//!
//! The word lists used by signal extraction are data, not code: they are
//! (de)serialisable via serde with per-field defaults, so deployments can
//! tune classification behaviour from a TOML file without rebuilding the
//! orchestrator. The compiled-in defaults match the documented scoring
//! behaviour and are used when no file is supplied.

use crate::OrchestratorError;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ── Default value functions ────────────────────────────────────────────

/// Default comparison vocabulary.
fn default_comparison_markers() -> Vec<String> {
    [
        "compare",
        "comparison",
        "versus",
        "vs",
        "vs.",
        "difference between",
        "differences between",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

/// Default conjunction/enumeration vocabulary.
fn default_multi_part_markers() -> Vec<String> {
    [" and also ", " as well as ", " and ", " along with "]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

/// Default reasoning vocabulary.
fn default_analytical_markers() -> Vec<String> {
    [
        "why",
        "analyze",
        "analyse",
        "analysis",
        "implications",
        "implication",
        "recommend",
        "recommendation",
        "evaluate",
        "assess",
        "explain",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

// ── Vocabulary ─────────────────────────────────────────────────────────

/// The marker word-lists that drive signal extraction.
///
/// Multi-word entries (containing whitespace) match as case-insensitive
/// substrings; single-word entries match whole words only, so `"vs"` does
/// not fire inside `"investigate"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vocabulary {
    /// Markers indicating the query compares two or more things.
    #[serde(default = "default_comparison_markers")]
    pub comparison_markers: Vec<String>,

    /// Conjunction/enumeration markers indicating a multi-part question.
    /// Numbered lists and repeated question marks are detected structurally
    /// and do not need entries here.
    #[serde(default = "default_multi_part_markers")]
    pub multi_part_markers: Vec<String>,

    /// Markers indicating the query asks for reasoning rather than lookup.
    #[serde(default = "default_analytical_markers")]
    pub analytical_markers: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            comparison_markers: default_comparison_markers(),
            multi_part_markers: default_multi_part_markers(),
            analytical_markers: default_analytical_markers(),
        }
    }
}

impl Vocabulary {
    /// Load a vocabulary from a TOML file.
    ///
    /// Missing fields fall back to the compiled-in defaults, so a file can
    /// override a single list without restating the others.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Io`] if the file cannot be read, or
    /// [`OrchestratorError::Config`] if it is not valid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, OrchestratorError> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| OrchestratorError::Config(format!("invalid vocabulary file: {e}")))
    }

    /// Return `true` if any marker in `markers` occurs in `text_lower`.
    ///
    /// `text_lower` must already be lowercased by the caller; markers are
    /// stored lowercase by convention.
    pub(crate) fn any_marker(text_lower: &str, markers: &[String]) -> bool {
        markers.iter().any(|m| {
            if m.chars().any(char::is_whitespace) {
                text_lower.contains(m.as_str())
            } else {
                contains_word(text_lower, m)
            }
        })
    }
}

/// Whole-word containment check over non-alphanumeric boundaries.
fn contains_word(text_lower: &str, word: &str) -> bool {
    let word = word.trim_end_matches('.');
    text_lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|tok| tok == word)
}

// ── Tests ──────────────────────────────────────────────────────────────
