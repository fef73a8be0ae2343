//! # hybrid-query-orchestrator
//!
//! A decision layer that routes each incoming natural-language query to one
//! of two caller-supplied answering capabilities:
//!
//! - a **fast retrieval** backend — single-pass, bounded latency, and
//! - a **deep reasoning** backend — multi-step, tool-using, slower.
//!
//! ## Architecture
//!
//! ```text
//! query → ComplexityAnalyzer → {score, signals} → HybridOrchestrator
//!       → selected backend (hard deadline, single fallback hop)
//!       → ExecutionResult → MetricsAggregator (side effect) → caller
//! ```
//!
//! The orchestrator never surfaces an error from a query: callers always
//! receive an [`ExecutionResult`]. The only fatal error is misconfiguration
//! at construction time.

// ── Lint policy (aerospace-grade) ─────────────────────────────────────────
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(missing_docs)]

use std::collections::HashMap;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub mod analysis;
pub mod backend;
pub mod routing;

// Re-exports for convenience
pub use analysis::{
    Approach, ComplexityAnalyzer, ComplexityClass, ComplexityResult, QuerySignals, Vocabulary,
};
pub use backend::{EchoBackend, FnBackend, QueryBackend};
pub use routing::{
    ExecutionResult, HybridOrchestrator, MetricsAggregator, MetricsSnapshot, OrchestratorBuilder,
    OrchestratorConfig, RoutingDecision,
};

/// Initialise the global tracing subscriber.
///
/// Reads the `LOG_FORMAT` environment variable to choose output format:
/// - `"json"` — structured JSON output for production log aggregators
/// - anything else (including unset) — human-readable pretty output
///
/// Filter level is controlled by `RUST_LOG` (e.g. `RUST_LOG=info`).
///
/// # Errors
///
/// Returns [`OrchestratorError::Other`] if the global subscriber has already
/// been set (e.g. by a previous call or a test harness).
pub fn init_tracing() -> Result<(), OrchestratorError> {
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let result = match format.as_str() {
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .with_current_span(true)
            .with_span_list(true)
            .try_init(),
        _ => tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init(),
    };

    result.map_err(|e| OrchestratorError::Other(format!("tracing init failed: {e}")))
}

/// Top-level orchestrator errors.
///
/// All variants implement `std::error::Error` via [`thiserror`].
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// A configuration value is invalid (e.g. threshold out of range,
    /// timeout ordering violated).
    ///
    /// This is returned at construction time so that misconfiguration
    /// surfaces immediately rather than silently degrading at query time.
    #[error("configuration error: {0}")]
    Config(String),

    /// A query backend reported a failure while answering.
    #[error("backend failed: {0}")]
    Backend(String),

    /// Filesystem I/O failed (e.g. during metrics export or vocabulary load).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for errors that do not fit a specific variant.
    #[error("{0}")]
    Other(String),
}

/// Opaque per-query context forwarded to the backends.
///
/// The orchestrator never inspects this; it exists so callers can thread
/// collection identifiers or request metadata through to their own
/// retrieval and reasoning functions.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    /// Optional index/collection identifier for the retrieval layer.
    pub collection: Option<String>,
    /// Arbitrary key-value metadata (e.g. `user_id`, `trace_id`).
    pub meta: HashMap<String, String>,
}

impl QueryContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context targeting a specific collection.
    pub fn for_collection(collection: impl Into<String>) -> Self {
        Self {
            collection: Some(collection.into()),
            meta: HashMap::new(),
        }
    }

    /// Attach a metadata entry, builder-style.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display_includes_message() {
        let err = OrchestratorError::Config("complexity_threshold out of range".to_string());
        assert!(err.to_string().contains("complexity_threshold out of range"));
    }

    #[test]
    fn test_query_context_for_collection_sets_collection() {
        let ctx = QueryContext::for_collection("bylaws-2025");
        assert_eq!(ctx.collection.as_deref(), Some("bylaws-2025"));
        assert!(ctx.meta.is_empty());
    }

    #[test]
    fn test_query_context_with_meta_accumulates() {
        let ctx = QueryContext::new()
            .with_meta("user_id", "u-1")
            .with_meta("trace_id", "t-9");
        assert_eq!(ctx.meta.get("user_id").map(String::as_str), Some("u-1"));
        assert_eq!(ctx.meta.get("trace_id").map(String::as_str), Some("t-9"));
    }

    #[test]
    fn test_init_tracing_second_call_returns_err() {
        // First call may succeed or fail depending on test execution order
        // (another test may have already installed a subscriber).
        let _ = init_tracing();
        // Second call must not panic — it should return Err.
        let result = init_tracing();
        assert!(result.is_err(), "double init must return Err, not panic");
    }
}
