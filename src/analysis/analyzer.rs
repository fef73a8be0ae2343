//! Complexity scoring and approach recommendation.
//!
//! Combines [`QuerySignals`] into a weighted score in `[0.0, 100.0]`,
//! buckets the score into a complexity class, and derives the recommended
//! answering approach. The score drives the routing decision:
//!
//! | Score                      | Class    | Approach                       |
//! |----------------------------|----------|--------------------------------|
//! | `< 35`                     | Simple   | Fast retrieval                 |
//! | `35 ..< threshold`         | Moderate | Fast, or Deep when configured  |
//! |`>= threshold` (default 50) | Complex  | Deep reasoning                 |
//!
//! ## Weights
//!
//! Each signal contributes a fixed point value when present:
//!
//! 1. **Comparison markers** → +25
//! 2. **Multi-part markers** → +20
//! 3. **Analytical markers** → +20
//! 4. **Multiple source references** → +15
//! 5. **Length** → `token_count / 2`, saturating at +20
//!
//! The raw sum is clamped to `[0.0, 100.0]`.

use super::signals::QuerySignals;
use super::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};

// ── Scoring constants ──────────────────────────────────────────────────

/// Points contributed by comparison vocabulary.
const COMPARISON_POINTS: f64 = 25.0;
/// Points contributed by multi-part structure.
const MULTI_PART_POINTS: f64 = 20.0;
/// Points contributed by analytical vocabulary.
const ANALYTICAL_POINTS: f64 = 20.0;
/// Points contributed by multiple source references.
const MULTI_SOURCE_POINTS: f64 = 15.0;
/// Ceiling for the query-length term.
const LENGTH_POINTS_CAP: f64 = 20.0;
/// Tokens per point for the length term.
const TOKENS_PER_POINT: f64 = 2.0;

/// Scores below this bucket as [`ComplexityClass::Simple`].
const SIMPLE_CEILING: f64 = 35.0;

// ── Value objects ──────────────────────────────────────────────────────

/// Complexity bucket for a scored query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComplexityClass {
    /// Single-fact lookup; the fast path is expected to suffice.
    Simple,
    /// Between the buckets; policy decides the approach.
    Moderate,
    /// Multi-step reasoning likely required.
    Complex,
}

impl std::fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Moderate => write!(f, "moderate"),
            Self::Complex => write!(f, "complex"),
        }
    }
}

/// Which answering path serves a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Approach {
    /// Single-pass retrieval-and-answer, bounded latency.
    Fast,
    /// Multi-step, tool-using reasoning, higher latency.
    Deep,
}

impl Approach {
    /// Return the opposite approach, used for the fallback hop.
    pub fn other(self) -> Self {
        match self {
            Self::Fast => Self::Deep,
            Self::Deep => Self::Fast,
        }
    }
}

impl std::fmt::Display for Approach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Deep => write!(f, "deep"),
        }
    }
}

/// The outcome of analysing one query.
///
/// `complexity_class` and `recommended_approach` are pure functions of
/// `score` and the analyzer configuration; nothing mutates them afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexityResult {
    /// Weighted signal combination in `[0.0, 100.0]`.
    pub score: f64,
    /// Bucketed score.
    pub complexity_class: ComplexityClass,
    /// Approach implied by the class and the moderate-query policy.
    pub recommended_approach: Approach,
    /// The signal breakdown, retained for explainability and logging.
    pub signals: QuerySignals,
}

/// Per-signal point contributions for one query.
///
/// Useful for debugging, logging, and transparency into routing decisions.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalContributions {
    /// Comparison marker contribution (0 or 25).
    pub comparison: f64,
    /// Multi-part marker contribution (0 or 20).
    pub multi_part: f64,
    /// Analytical marker contribution (0 or 20).
    pub analytical: f64,
    /// Multi-source contribution (0 or 15).
    pub multi_source: f64,
    /// Length term, `token_count / 2` capped at 20.
    pub length: f64,
    /// Final clamped score in `[0.0, 100.0]`.
    pub total: f64,
}

// ── Analyzer ───────────────────────────────────────────────────────────

/// A query complexity analyzer.
///
/// Stateless after construction and cheap to call: analysis is a single
/// O(n) scan over the query text with no I/O and no clock dependence.
#[derive(Debug, Clone)]
pub struct ComplexityAnalyzer {
    vocabulary: Vocabulary,
    /// Scores at or above this value bucket as Complex.
    complexity_threshold: f64,
    /// Whether Moderate queries are recommended the deep path.
    use_deep_for_moderate: bool,
}

impl ComplexityAnalyzer {
    /// Create an analyzer with a compiled-in default vocabulary.
    ///
    /// `complexity_threshold` is the inclusive lower bound of the Complex
    /// bucket; callers validate its range before construction.
    pub fn new(complexity_threshold: f64, use_deep_for_moderate: bool) -> Self {
        Self {
            vocabulary: Vocabulary::default(),
            complexity_threshold,
            use_deep_for_moderate,
        }
    }

    /// Replace the marker vocabulary, builder-style.
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Analyse a query.
    ///
    /// Never fails for any string input; empty or whitespace-only text
    /// scores 0 and buckets as Simple.
    pub fn analyze(&self, query: &str) -> ComplexityResult {
        let signals = QuerySignals::extract(query, &self.vocabulary);
        let score = self.contributions_of(&signals).total;
        let complexity_class = self.bucket(score);
        let recommended_approach = self.recommend(complexity_class);

        ComplexityResult {
            score,
            complexity_class,
            recommended_approach,
            signals,
        }
    }

    /// Per-signal point contributions for a query.
    pub fn contributions(&self, query: &str) -> SignalContributions {
        self.contributions_of(&QuerySignals::extract(query, &self.vocabulary))
    }

    fn contributions_of(&self, signals: &QuerySignals) -> SignalContributions {
        let comparison = points_if(signals.has_comparison_markers, COMPARISON_POINTS);
        let multi_part = points_if(signals.has_multi_part_markers, MULTI_PART_POINTS);
        let analytical = points_if(signals.has_analytical_markers, ANALYTICAL_POINTS);
        let multi_source = points_if(signals.mentions_multiple_sources, MULTI_SOURCE_POINTS);
        let length = (signals.token_count as f64 / TOKENS_PER_POINT).min(LENGTH_POINTS_CAP);
        let total =
            clamp_score(comparison + multi_part + analytical + multi_source + length);

        SignalContributions {
            comparison,
            multi_part,
            analytical,
            multi_source,
            length,
            total,
        }
    }

    /// Bucket a score.
    ///
    /// The configured threshold is the *inclusive* lower bound of Complex,
    /// so a score exactly at the threshold classifies Complex even when the
    /// threshold sits below the Simple ceiling.
    fn bucket(&self, score: f64) -> ComplexityClass {
        if score >= self.complexity_threshold {
            ComplexityClass::Complex
        } else if score < SIMPLE_CEILING {
            ComplexityClass::Simple
        } else {
            ComplexityClass::Moderate
        }
    }

    fn recommend(&self, class: ComplexityClass) -> Approach {
        match class {
            ComplexityClass::Complex => Approach::Deep,
            ComplexityClass::Simple => Approach::Fast,
            ComplexityClass::Moderate => {
                if self.use_deep_for_moderate {
                    Approach::Deep
                } else {
                    Approach::Fast
                }
            }
        }
    }
}

impl Default for ComplexityAnalyzer {
    fn default() -> Self {
        Self::new(50.0, false)
    }
}

// ── Helpers ────────────────────────────────────────────────────────────

/// Fixed point value when a boolean signal is present.
fn points_if(present: bool, points: f64) -> f64 {
    if present {
        points
    } else {
        0.0
    }
}

/// Clamp a raw score to the valid `[0.0, 100.0]` range.
fn clamp_score(raw: f64) -> f64 {
    raw.clamp(0.0, 100.0)
}

// ── Tests ──────────────────────────────────────────────────────────────
