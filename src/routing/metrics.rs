//! Query outcome bookkeeping.
//!
//! Tracks per-approach query counts, elapsed-time accumulators, fallback
//! and success/failure totals, and derives rates on snapshot. The
//! aggregator is an explicit instance owned by the orchestrator — never
//! ambient global state — and is the only mutable state shared between
//! concurrent queries.
//!
//! Times are stored as micro-seconds in integers to avoid floating-point
//! drift in long-running aggregations.

use crate::analysis::Approach;
use crate::routing::orchestrator::ExecutionResult;
use crate::OrchestratorError;
use serde::Serialize;
use std::path::Path;
use std::sync::RwLock;

/// Mutable counter state behind the aggregator's lock.
#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    total_queries: u64,
    fast_queries: u64,
    deep_queries: u64,
    fallback_count: u64,
    success_count: u64,
    failure_count: u64,
    fast_time_micros: u64,
    deep_time_micros: u64,
}

/// Process-wide query outcome aggregator.
///
/// All counters start at zero at construction, advance exactly once per
/// completed query via [`record`](Self::record), and reset only through an
/// explicit [`reset`](Self::reset). Interior locking makes concurrent
/// `record`/`snapshot` calls safe; a snapshot is a consistent
/// point-in-time copy, never a live view.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    inner: RwLock<Counters>,
}

impl MetricsAggregator {
    /// Create an aggregator with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed query.
    ///
    /// The query is counted under the approach that ultimately produced
    /// the response, so `total_queries == fast_queries + deep_queries`
    /// holds at every snapshot. Side-effect only; never fails.
    pub fn record(&self, result: &ExecutionResult) {
        let elapsed_micros = (result.execution_time_seconds * 1_000_000.0).max(0.0) as u64;

        if let Ok(mut inner) = self.inner.write() {
            inner.total_queries += 1;
            match result.approach {
                Approach::Fast => {
                    inner.fast_queries += 1;
                    inner.fast_time_micros += elapsed_micros;
                }
                Approach::Deep => {
                    inner.deep_queries += 1;
                    inner.deep_time_micros += elapsed_micros;
                }
            }
            if result.fallback_used {
                inner.fallback_count += 1;
            }
            if result.error.is_none() {
                inner.success_count += 1;
            } else {
                inner.failure_count += 1;
            }
        }
    }

    /// Return a consistent point-in-time snapshot with derived rates.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self
            .inner
            .read()
            .map(|guard| *guard)
            .unwrap_or_default();

        MetricsSnapshot::from_counters(counters)
    }

    /// Zero every counter.
    ///
    /// Intended for test isolation and explicit operator action only; the
    /// orchestrator never calls this implicitly.
    pub fn reset(&self) {
        if let Ok(mut inner) = self.inner.write() {
            *inner = Counters::default();
        }
    }

    /// Serialise the current snapshot to `path` as a flat JSON object.
    ///
    /// The deep-path fields keep the `langgraph_*` key names because
    /// downstream dashboards consume them under those keys.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Io`] if the file cannot be written, or
    /// [`OrchestratorError::Other`] if serialisation fails.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<(), OrchestratorError> {
        let record = ExportRecord::from(&self.snapshot());
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| OrchestratorError::Other(format!("metrics serialisation failed: {e}")))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Point-in-time copy of the aggregator with derived read-only views.
///
/// Every derived rate is `0.0` when its denominator is zero — reading an
/// empty aggregator never produces a division error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// Completed queries since construction or the last reset.
    pub total_queries: u64,
    /// Queries ultimately answered by the fast retrieval path.
    pub fast_queries: u64,
    /// Queries ultimately answered by the deep reasoning path.
    pub deep_queries: u64,
    /// Queries that needed the fallback hop.
    pub fallback_count: u64,
    /// Queries that produced a normal answer.
    pub success_count: u64,
    /// Queries where both paths failed.
    pub failure_count: u64,
    /// Accumulated fast-path time in seconds.
    pub fast_time_total: f64,
    /// Accumulated deep-path time in seconds.
    pub deep_time_total: f64,
    /// Share of queries answered fast, in percent.
    pub fast_percentage: f64,
    /// Share of queries answered deep, in percent.
    pub deep_percentage: f64,
    /// Fraction of queries that produced a normal answer, in `[0.0, 1.0]`.
    pub success_rate: f64,
    /// Mean fast-path elapsed seconds.
    pub avg_fast_time: f64,
    /// Mean deep-path elapsed seconds.
    pub avg_deep_time: f64,
}

impl MetricsSnapshot {
    fn from_counters(c: Counters) -> Self {
        let fast_time_total = c.fast_time_micros as f64 / 1_000_000.0;
        let deep_time_total = c.deep_time_micros as f64 / 1_000_000.0;

        Self {
            total_queries: c.total_queries,
            fast_queries: c.fast_queries,
            deep_queries: c.deep_queries,
            fallback_count: c.fallback_count,
            success_count: c.success_count,
            failure_count: c.failure_count,
            fast_time_total,
            deep_time_total,
            fast_percentage: percentage(c.fast_queries, c.total_queries),
            deep_percentage: percentage(c.deep_queries, c.total_queries),
            success_rate: ratio(c.success_count, c.total_queries),
            avg_fast_time: mean(fast_time_total, c.fast_queries),
            avg_deep_time: mean(deep_time_total, c.deep_queries),
        }
    }
}

/// Flat export record with the key names downstream consumers expect.
#[derive(Debug, Serialize)]
struct ExportRecord {
    total_queries: u64,
    fast_queries: u64,
    langgraph_queries: u64,
    fallback_count: u64,
    success_rate: f64,
    avg_fast_time: f64,
    avg_langgraph_time: f64,
    fast_percentage: f64,
    langgraph_percentage: f64,
}

impl From<&MetricsSnapshot> for ExportRecord {
    fn from(s: &MetricsSnapshot) -> Self {
        Self {
            total_queries: s.total_queries,
            fast_queries: s.fast_queries,
            langgraph_queries: s.deep_queries,
            fallback_count: s.fallback_count,
            success_rate: s.success_rate,
            avg_fast_time: s.avg_fast_time,
            avg_langgraph_time: s.avg_deep_time,
            fast_percentage: s.fast_percentage,
            langgraph_percentage: s.deep_percentage,
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────────

/// `numerator / denominator * 100`, or 0 for an empty denominator.
fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

/// `numerator / denominator`, or 0 for an empty denominator.
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// `total / count`, or 0 for an empty count.
fn mean(total: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Approach, ComplexityAnalyzer};
    use crate::routing::orchestrator::RoutingDecision;

    fn result(approach: Approach, seconds: f64, fallback: bool, failed: bool) -> ExecutionResult {
        let complexity = ComplexityAnalyzer::default().analyze("sample query");
        ExecutionResult {
            response: if failed { String::new() } else { "ok".to_string() },
            approach,
            execution_time_seconds: seconds,
            fallback_used: fallback,
            error: failed.then(|| "both paths failed".to_string()),
            decision: RoutingDecision {
                approach_chosen: approach,
                fallback_triggered: fallback,
                complexity,
            },
        }
    }

    // -- recording -------------------------------------------------------

    #[test]
    fn test_record_fast_success_updates_counters() {
        let metrics = MetricsAggregator::new();
        metrics.record(&result(Approach::Fast, 0.5, false, false));

        let snap = metrics.snapshot();
        assert_eq!(snap.total_queries, 1);
        assert_eq!(snap.fast_queries, 1);
        assert_eq!(snap.deep_queries, 0);
        assert_eq!(snap.success_count, 1);
        assert_eq!(snap.failure_count, 0);
        assert!((snap.fast_time_total - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_record_deep_query_updates_deep_bucket() {
        let metrics = MetricsAggregator::new();
        metrics.record(&result(Approach::Deep, 2.0, false, false));

        let snap = metrics.snapshot();
        assert_eq!(snap.deep_queries, 1);
        assert_eq!(snap.fast_queries, 0);
        assert!((snap.deep_time_total - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_record_fallback_counts_under_final_approach() {
        let metrics = MetricsAggregator::new();
        // Chose fast, fell back to deep: counted as a deep query.
        metrics.record(&result(Approach::Deep, 3.0, true, false));

        let snap = metrics.snapshot();
        assert_eq!(snap.total_queries, 1);
        assert_eq!(snap.deep_queries, 1);
        assert_eq!(snap.fast_queries, 0);
        assert_eq!(snap.fallback_count, 1);
    }

    #[test]
    fn test_record_total_failure_increments_failure_count() {
        let metrics = MetricsAggregator::new();
        metrics.record(&result(Approach::Deep, 1.0, true, true));

        let snap = metrics.snapshot();
        assert_eq!(snap.failure_count, 1);
        assert_eq!(snap.success_count, 0);
        assert_eq!(snap.total_queries, 1);
    }

    #[test]
    fn test_conservation_invariant_across_mixed_outcomes() {
        let metrics = MetricsAggregator::new();
        metrics.record(&result(Approach::Fast, 0.1, false, false));
        metrics.record(&result(Approach::Deep, 1.0, false, false));
        metrics.record(&result(Approach::Deep, 2.0, true, false));
        metrics.record(&result(Approach::Fast, 0.2, true, true));

        let snap = metrics.snapshot();
        assert_eq!(snap.total_queries, 4);
        assert_eq!(snap.fast_queries + snap.deep_queries, snap.total_queries);
        assert!(snap.fallback_count <= snap.total_queries);
    }

    #[test]
    fn test_negative_elapsed_time_clamps_to_zero() {
        // A backwards clock must not wrap the accumulator.
        let metrics = MetricsAggregator::new();
        metrics.record(&result(Approach::Fast, -1.0, false, false));
        let snap = metrics.snapshot();
        assert!(snap.fast_time_total.abs() < f64::EPSILON);
    }

    // -- derived views ---------------------------------------------------

    #[test]
    fn test_empty_snapshot_all_rates_zero() {
        let snap = MetricsAggregator::new().snapshot();
        assert_eq!(snap.total_queries, 0);
        assert!(snap.fast_percentage.abs() < f64::EPSILON);
        assert!(snap.deep_percentage.abs() < f64::EPSILON);
        assert!(snap.success_rate.abs() < f64::EPSILON);
        assert!(snap.avg_fast_time.abs() < f64::EPSILON);
        assert!(snap.avg_deep_time.abs() < f64::EPSILON);
    }

    #[test]
    fn test_percentages_split_across_approaches() {
        let metrics = MetricsAggregator::new();
        metrics.record(&result(Approach::Fast, 0.1, false, false));
        metrics.record(&result(Approach::Fast, 0.1, false, false));
        metrics.record(&result(Approach::Fast, 0.1, false, false));
        metrics.record(&result(Approach::Deep, 1.0, false, false));

        let snap = metrics.snapshot();
        assert!((snap.fast_percentage - 75.0).abs() < 1e-9);
        assert!((snap.deep_percentage - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_success_rate_is_a_fraction() {
        let metrics = MetricsAggregator::new();
        metrics.record(&result(Approach::Fast, 0.1, false, false));
        metrics.record(&result(Approach::Fast, 0.1, true, true));

        let snap = metrics.snapshot();
        assert!((snap.success_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_avg_times_divide_by_per_approach_counts() {
        let metrics = MetricsAggregator::new();
        metrics.record(&result(Approach::Fast, 1.0, false, false));
        metrics.record(&result(Approach::Fast, 3.0, false, false));
        metrics.record(&result(Approach::Deep, 10.0, false, false));

        let snap = metrics.snapshot();
        assert!((snap.avg_fast_time - 2.0).abs() < 1e-6);
        assert!((snap.avg_deep_time - 10.0).abs() < 1e-6);
    }

    // -- reset -----------------------------------------------------------

    #[test]
    fn test_reset_zeroes_everything() {
        let metrics = MetricsAggregator::new();
        metrics.record(&result(Approach::Fast, 1.0, true, false));
        metrics.reset();

        let snap = metrics.snapshot();
        assert_eq!(snap, MetricsAggregator::new().snapshot());
    }

    // -- export ----------------------------------------------------------

    #[test]
    fn test_export_writes_expected_key_names() {
        let metrics = MetricsAggregator::new();
        metrics.record(&result(Approach::Fast, 0.5, false, false));
        metrics.record(&result(Approach::Deep, 2.0, true, false));

        let dir = tempfile::tempdir()
            .unwrap_or_else(|e| std::panic::panic_any(format!("test: tempdir: {e}")));
        let path = dir.path().join("metrics.json");
        metrics
            .export(&path)
            .unwrap_or_else(|e| std::panic::panic_any(format!("test: export: {e}")));

        let raw = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| std::panic::panic_any(format!("test: read: {e}")));
        let parsed: serde_json::Value = serde_json::from_str(&raw)
            .unwrap_or_else(|e| std::panic::panic_any(format!("test: parse: {e}")));

        assert_eq!(parsed["total_queries"], 2);
        assert_eq!(parsed["fast_queries"], 1);
        assert_eq!(parsed["langgraph_queries"], 1);
        assert_eq!(parsed["fallback_count"], 1);
        assert!(parsed.get("avg_langgraph_time").is_some());
        assert!(parsed.get("langgraph_percentage").is_some());
        assert!(parsed.get("success_rate").is_some());
    }

    #[test]
    fn test_export_to_unwritable_path_is_io_error() {
        let metrics = MetricsAggregator::new();
        let result = metrics.export("/nonexistent-dir/metrics.json");
        assert!(matches!(result, Err(OrchestratorError::Io(_))));
    }
}
