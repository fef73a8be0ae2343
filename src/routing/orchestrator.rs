//! Hybrid routing orchestration.
//!
//! [`HybridOrchestrator`] combines a
//! [`ComplexityAnalyzer`](crate::ComplexityAnalyzer) with an
//! [`OrchestratorConfig`](super::OrchestratorConfig), two caller-supplied
//! backends, and a [`MetricsAggregator`](super::MetricsAggregator) to
//! answer each query through the cheapest path likely to succeed.
//!
//! ## Execution model
//!
//! Each attempt runs on a spawned task raced against the configured hard
//! deadline. If the deadline elapses first the task is **abandoned, not
//! joined**: the backend call may keep consuming resources until it
//! finishes on its own, but its eventual result is discarded and the
//! orchestrator moves on. Preemptive kill of an uncooperative backend is
//! out of scope; backends that honour cancellation stop when their future
//! is dropped at process shutdown.
//!
//! A failed or timed-out primary attempt triggers exactly one fallback hop
//! to the other backend under its own deadline. There is no chained
//! fallback, which bounds worst-case latency to
//! `fast_timeout + deep_timeout`.

use crate::analysis::{Approach, ComplexityAnalyzer, ComplexityResult, Vocabulary};
use crate::backend::QueryBackend;
use crate::routing::config::OrchestratorConfig;
use crate::routing::metrics::{MetricsAggregator, MetricsSnapshot};
use crate::{OrchestratorError, QueryContext};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Caller-visible response text when both paths fail.
const DEGRADED_RESPONSE: &str =
    "The query could not be answered right now. Please try again shortly.";

// ── Value objects ──────────────────────────────────────────────────────

/// The routing decision made for a single query, retained for auditing.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDecision {
    /// The approach the complexity analysis (and availability) selected.
    pub approach_chosen: Approach,
    /// Whether the chosen approach failed and the other was substituted.
    pub fallback_triggered: bool,
    /// The analysis that drove the choice.
    pub complexity: ComplexityResult,
}

/// The outcome of one `route_and_execute` call.
///
/// Callers always receive this value — a failed query surfaces as a
/// populated `error` with a degraded `response`, never as an `Err`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// The answer text, or a degraded placeholder on total failure.
    pub response: String,
    /// The approach that actually produced the response. Differs from
    /// `decision.approach_chosen` when the fallback hop fired.
    pub approach: Approach,
    /// Wall-clock time for the whole call, including any fallback attempt.
    pub execution_time_seconds: f64,
    /// Whether the fallback hop fired.
    pub fallback_used: bool,
    /// Populated only when both paths failed or timed out.
    pub error: Option<String>,
    /// The full routing decision, for explainability.
    pub decision: RoutingDecision,
}

/// How a single backend attempt ended short of an answer.
#[derive(Debug)]
enum AttemptError {
    /// The backend did not return before its hard deadline; the attempt
    /// task was abandoned.
    DeadlineElapsed(Duration),
    /// The backend returned an error (or its task aborted).
    Failed(String),
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeadlineElapsed(limit) => {
                write!(f, "deadline of {:.1}s elapsed", limit.as_secs_f64())
            }
            Self::Failed(message) => write!(f, "{message}"),
        }
    }
}

// ── Builder ────────────────────────────────────────────────────────────

/// Builder for [`HybridOrchestrator`].
///
/// The fast retrieval backend is required; the deep reasoning backend is
/// optional and its availability is resolved once here, not rediscovered
/// per query.
#[derive(Default)]
pub struct OrchestratorBuilder {
    config: Option<OrchestratorConfig>,
    vocabulary: Option<Vocabulary>,
    fast: Option<Arc<dyn QueryBackend>>,
    deep: Option<Arc<dyn QueryBackend>>,
}

impl OrchestratorBuilder {
    /// Start a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the orchestrator configuration (validated at `build`).
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the analyzer's marker vocabulary.
    pub fn vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    /// Supply the fast retrieval backend (required).
    pub fn fast_backend(mut self, backend: impl QueryBackend + 'static) -> Self {
        self.fast = Some(Arc::new(backend));
        self
    }

    /// Supply the deep reasoning backend (optional).
    pub fn deep_backend(mut self, backend: impl QueryBackend + 'static) -> Self {
        self.deep = Some(Arc::new(backend));
        self
    }

    /// Validate the configuration and assemble the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Config`] when the configuration
    /// violates a constraint or no fast backend was supplied.
    /// Misconfiguration is intentionally fatal here rather than a silent
    /// degradation at query time.
    pub fn build(self) -> Result<HybridOrchestrator, OrchestratorError> {
        let config = self.config.unwrap_or_default().validated()?;
        let fast = self.fast.ok_or_else(|| {
            OrchestratorError::Config("a fast retrieval backend is required".to_string())
        })?;

        let mut analyzer =
            ComplexityAnalyzer::new(config.complexity_threshold, config.use_deep_for_moderate);
        if let Some(vocabulary) = self.vocabulary {
            analyzer = analyzer.with_vocabulary(vocabulary);
        }

        if self.deep.is_none() {
            warn!("no deep reasoning backend configured; every query will route fast");
        }

        Ok(HybridOrchestrator {
            analyzer,
            config,
            fast,
            deep: self.deep,
            metrics: MetricsAggregator::new(),
        })
    }
}

impl std::fmt::Debug for OrchestratorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestratorBuilder")
            .field("config", &self.config)
            .field("has_fast", &self.fast.is_some())
            .field("has_deep", &self.deep.is_some())
            .finish()
    }
}

// ── Orchestrator ───────────────────────────────────────────────────────

/// The hybrid query orchestrator.
///
/// Immutable after construction apart from the owned metrics aggregator;
/// safe to share across tasks behind an `Arc` and call concurrently.
pub struct HybridOrchestrator {
    analyzer: ComplexityAnalyzer,
    config: OrchestratorConfig,
    fast: Arc<dyn QueryBackend>,
    deep: Option<Arc<dyn QueryBackend>>,
    metrics: MetricsAggregator,
}

impl std::fmt::Debug for HybridOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridOrchestrator")
            .field("config", &self.config)
            .field("deep_reasoning_available", &self.deep.is_some())
            .finish()
    }
}

impl HybridOrchestrator {
    /// Start building an orchestrator.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Whether a deep reasoning backend was configured.
    ///
    /// Resolved once at construction; when `false`, every routing decision
    /// short-circuits to the fast path.
    pub fn deep_reasoning_available(&self) -> bool {
        self.deep.is_some()
    }

    /// Analyse a query without executing it.
    pub fn analyze(&self, query: &str) -> ComplexityResult {
        self.analyzer.analyze(query)
    }

    /// Route a query to the appropriate backend and execute it.
    ///
    /// Always returns an [`ExecutionResult`]; total failure of both paths
    /// surfaces as a populated `error`, never as a panic or `Err`. Metrics
    /// are updated exactly once per call, on every path.
    pub async fn route_and_execute(&self, query: &str, ctx: &QueryContext) -> ExecutionResult {
        let started = Instant::now();
        let complexity = self.analyzer.analyze(query);

        let chosen = self.select_approach(&complexity);
        debug!(
            score = complexity.score,
            class = %complexity.complexity_class,
            approach = %chosen,
            "routing decision"
        );

        let result = match self.attempt(chosen, query, ctx).await {
            Ok(response) => self.completed(started, complexity, chosen, chosen, response, None),
            Err(primary_err) => {
                warn!(approach = %chosen, error = %primary_err, "primary attempt failed");
                self.fall_back(started, complexity, chosen, primary_err, query, ctx)
                    .await
            }
        };

        self.metrics.record(&result);
        info!(
            approach = %result.approach,
            fallback = result.fallback_used,
            elapsed_s = result.execution_time_seconds,
            failed = result.error.is_some(),
            "query completed"
        );
        result
    }

    /// Return a consistent point-in-time metrics snapshot.
    pub fn statistics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Write the current metrics snapshot to `path` as flat JSON.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Io`] if the file cannot be written.
    pub fn export_metrics(&self, path: impl AsRef<Path>) -> Result<(), OrchestratorError> {
        self.metrics.export(path)
    }

    /// Zero the metrics counters. Explicit operator/test action only.
    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }

    // ── Internals ──────────────────────────────────────────────────────

    /// Apply the availability short-circuit to the analyzer's
    /// recommendation.
    fn select_approach(&self, complexity: &ComplexityResult) -> Approach {
        match complexity.recommended_approach {
            Approach::Deep if self.deep.is_none() => {
                debug!("deep path recommended but unavailable; short-circuiting to fast");
                Approach::Fast
            }
            approach => approach,
        }
    }

    fn backend_for(&self, approach: Approach) -> Option<Arc<dyn QueryBackend>> {
        match approach {
            Approach::Fast => Some(Arc::clone(&self.fast)),
            Approach::Deep => self.deep.as_ref().map(Arc::clone),
        }
    }

    fn deadline_for(&self, approach: Approach) -> Duration {
        match approach {
            Approach::Fast => self.config.fast_timeout(),
            Approach::Deep => self.config.deep_timeout(),
        }
    }

    /// Run one backend attempt under its hard deadline.
    ///
    /// The attempt runs on its own task; when the deadline elapses first
    /// the task is abandoned and its eventual output discarded.
    async fn attempt(
        &self,
        approach: Approach,
        query: &str,
        ctx: &QueryContext,
    ) -> Result<String, AttemptError> {
        let backend = self
            .backend_for(approach)
            .ok_or_else(|| AttemptError::Failed("deep reasoning unavailable".to_string()))?;
        let limit = self.deadline_for(approach);

        let query = query.to_string();
        let ctx = ctx.clone();
        let handle = tokio::spawn(async move { backend.answer(&query, &ctx).await });

        match tokio::time::timeout(limit, handle).await {
            Ok(Ok(Ok(response))) => Ok(response),
            Ok(Ok(Err(e))) => Err(AttemptError::Failed(e.to_string())),
            Ok(Err(join_err)) => Err(AttemptError::Failed(format!(
                "backend task aborted: {join_err}"
            ))),
            Err(_) => {
                warn!(approach = %approach, limit_s = limit.as_secs_f64(), "attempt abandoned at deadline");
                Err(AttemptError::DeadlineElapsed(limit))
            }
        }
    }

    /// The single allowed fallback hop after a failed primary attempt.
    async fn fall_back(
        &self,
        started: Instant,
        complexity: ComplexityResult,
        chosen: Approach,
        primary_err: AttemptError,
        query: &str,
        ctx: &QueryContext,
    ) -> ExecutionResult {
        let alternate = chosen.other();
        if self.backend_for(alternate).is_none() {
            return self.failed(
                started,
                complexity,
                chosen,
                chosen,
                false,
                format!("{chosen} path failed ({primary_err}); no {alternate} path configured"),
            );
        }

        match self.attempt(alternate, query, ctx).await {
            Ok(response) => {
                info!(from = %chosen, to = %alternate, "fallback answered the query");
                self.completed(started, complexity, chosen, alternate, response, Some(true))
            }
            Err(fallback_err) => self.failed(
                started,
                complexity,
                chosen,
                alternate,
                true,
                format!(
                    "{chosen} path failed ({primary_err}); {alternate} path failed ({fallback_err})"
                ),
            ),
        }
    }

    fn completed(
        &self,
        started: Instant,
        complexity: ComplexityResult,
        chosen: Approach,
        served_by: Approach,
        response: String,
        fallback: Option<bool>,
    ) -> ExecutionResult {
        let fallback_used = fallback.unwrap_or(false);
        ExecutionResult {
            response,
            approach: served_by,
            execution_time_seconds: started.elapsed().as_secs_f64(),
            fallback_used,
            error: None,
            decision: RoutingDecision {
                approach_chosen: chosen,
                fallback_triggered: fallback_used,
                complexity,
            },
        }
    }

    fn failed(
        &self,
        started: Instant,
        complexity: ComplexityResult,
        chosen: Approach,
        last_attempted: Approach,
        fallback_used: bool,
        message: String,
    ) -> ExecutionResult {
        ExecutionResult {
            response: DEGRADED_RESPONSE.to_string(),
            approach: last_attempted,
            execution_time_seconds: started.elapsed().as_secs_f64(),
            fallback_used,
            error: Some(message),
            decision: RoutingDecision {
                approach_chosen: chosen,
                fallback_triggered: fallback_used,
                complexity,
            },
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
