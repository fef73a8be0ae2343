//! # Stage: Query Complexity Analysis
//!
//! ## Responsibility
//! Turn raw query text into a complexity score in `[0.0, 100.0]` plus the
//! signal breakdown that produced it, and derive the recommended answering
//! approach (fast retrieval vs deep reasoning).
//!
//! ## Guarantees
//! - Deterministic: the same query text and configuration always produce a
//!   bit-identical [`ComplexityResult`] — no randomness, no clock, no state.
//! - Total: any string input, including empty/whitespace-only, produces a
//!   valid result. Nothing here returns an error.
//! - Non-blocking: a pure O(n) scan over the query text with no I/O.
//! - Monotonic: adding markers or tokens to a query never lowers its score.
//!
//! ## NOT Responsible For
//! - Actually answering the query (that belongs to `backend` / `routing`)
//! - Timeout enforcement or fallback (that belongs to `routing`)
//! - Semantic understanding of the query (heuristic-only)

pub mod analyzer;
pub mod signals;
pub mod vocabulary;

// Re-exports for convenience
pub use analyzer::{
    Approach, ComplexityAnalyzer, ComplexityClass, ComplexityResult, SignalContributions,
};
pub use signals::QuerySignals;
pub use vocabulary::Vocabulary;
