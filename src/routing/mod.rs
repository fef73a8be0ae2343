//! # Stage: Hybrid Routing Orchestration
//!
//! ## Responsibility
//! Decide, per query, whether the fast retrieval backend or the deep
//! reasoning backend answers it; enforce a hard deadline on the attempt;
//! perform at most one fallback hop to the other backend on failure or
//! timeout; and record every outcome in the metrics aggregator.
//!
//! ## Guarantees
//! - Total: `route_and_execute` always returns an [`ExecutionResult`],
//!   never an error. The only fallible surface is construction.
//! - Bounded: worst-case latency per query is
//!   `fast_timeout + deep_timeout` — one primary attempt plus at most one
//!   fallback, no chained retries.
//! - Accounted: metrics are updated exactly once per completed query, and
//!   `total_queries == fast_queries + deep_queries` holds at every
//!   snapshot.
//! - Thread-safe: concurrent `route_and_execute` calls share no mutable
//!   state except the aggregator, which uses interior locking.
//!
//! ## NOT Responsible For
//! - Answering queries (backends are caller-supplied black boxes)
//! - Complexity scoring internals (that belongs to `analysis`)
//! - Caller-facing cancellation (an invocation runs to completion, to
//!   fallback, or to the combined timeout ceiling)

pub mod config;
pub mod metrics;
pub mod orchestrator;

// Re-exports for convenience
pub use config::OrchestratorConfig;
pub use metrics::{MetricsAggregator, MetricsSnapshot};
pub use orchestrator::{
    ExecutionResult, HybridOrchestrator, OrchestratorBuilder, RoutingDecision,
};
