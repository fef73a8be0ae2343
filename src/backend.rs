//! Query backend abstraction.
//!
//! Provides the [`QueryBackend`] trait the orchestrator races against its
//! hard deadlines, plus two ready-made implementations:
//!
//! - [`FnBackend`]: adapts a caller-supplied **synchronous** answering
//!   function onto the blocking pool, so plain retrieval/reasoning
//!   functions plug in without writing an async impl.
//! - [`EchoBackend`]: deterministic test/demo backend with a configurable
//!   delay.
//!
//! Backends are treated as black boxes: they are responsible for their own
//! internal thread and resource safety, and the orchestrator does not
//! serialize calls into them.

use crate::{OrchestratorError, QueryContext};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for query answering backends.
///
/// Implementations must be thread-safe (`Send + Sync`) for use across
/// tasks. The trait is object-safe to allow dynamic dispatch via
/// `Arc<dyn QueryBackend>`.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Answer the given query.
    ///
    /// The orchestrator enforces its hard deadline externally; an
    /// implementation does not need to be timeout-aware, but a call that
    /// outlives its deadline is abandoned and its eventual result is
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Backend`] (or any other variant) when
    /// the backend cannot produce an answer.
    async fn answer(&self, query: &str, ctx: &QueryContext) -> Result<String, OrchestratorError>;
}

// ============================================================================
// Function-backed backend
// ============================================================================

/// Signature for caller-supplied synchronous answering functions.
type AnswerFn = dyn Fn(&str, &QueryContext) -> Result<String, String> + Send + Sync;

/// Adapts a synchronous answering function into a [`QueryBackend`].
///
/// The function runs on Tokio's blocking pool via
/// [`tokio::task::spawn_blocking`], so a slow call never stalls the async
/// runtime. When the orchestrator abandons a timed-out attempt the blocking
/// call keeps running to completion on its pool thread; its result is
/// simply dropped.
///
/// ## Example
///
/// ```rust
/// use hybrid_query_orchestrator::FnBackend;
///
/// let fast = FnBackend::new(|query, _ctx| {
///     Ok(format!("top match for: {query}"))
/// });
/// ```
#[derive(Clone)]
pub struct FnBackend {
    func: Arc<AnswerFn>,
}

impl FnBackend {
    /// Wrap a synchronous answering function.
    ///
    /// The function returns `Err(message)` to signal failure; the message
    /// surfaces as [`OrchestratorError::Backend`].
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&str, &QueryContext) -> Result<String, String> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }
}

impl std::fmt::Debug for FnBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnBackend").finish_non_exhaustive()
    }
}

#[async_trait]
impl QueryBackend for FnBackend {
    async fn answer(&self, query: &str, ctx: &QueryContext) -> Result<String, OrchestratorError> {
        let func = Arc::clone(&self.func);
        let query = query.to_string();
        let ctx = ctx.clone();

        let joined = tokio::task::spawn_blocking(move || func(&query, &ctx)).await;
        match joined {
            Ok(Ok(answer)) => Ok(answer),
            Ok(Err(message)) => Err(OrchestratorError::Backend(message)),
            Err(e) => Err(OrchestratorError::Backend(format!(
                "answering function panicked or was cancelled: {e}"
            ))),
        }
    }
}

// ============================================================================
// Echo backend (testing)
// ============================================================================

/// Dummy echo backend for tests and demos.
///
/// Sleeps for the configured delay, then echoes the query back. Useful for
/// orchestrator smoke tests without real retrieval dependencies.
#[derive(Debug, Clone)]
pub struct EchoBackend {
    /// Simulated answering delay in milliseconds.
    pub delay_ms: u64,
}

impl EchoBackend {
    /// Create an echo backend with a small default delay.
    pub fn new() -> Self {
        Self { delay_ms: 10 }
    }

    /// Create an echo backend with a specific delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}

impl Default for EchoBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryBackend for EchoBackend {
    async fn answer(&self, query: &str, _ctx: &QueryContext) -> Result<String, OrchestratorError> {
        tokio::time::sleep(tokio::time::Duration::from_millis(self.delay_ms)).await;
        Ok(format!("echo: {query}"))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
