//! Orchestrator configuration types.
//!
//! Provides [`OrchestratorConfig`] for tuning the complexity threshold, the
//! moderate-query policy, and the per-path timeouts. All fields have
//! sensible defaults and are (de)serialisable via serde for TOML/JSON
//! config files. Validation happens once, before construction; a validated
//! config is immutable for the life of the orchestrator.

use crate::OrchestratorError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ── Default value functions ────────────────────────────────────────────

/// Default complexity score at which queries bucket as complex.
fn default_complexity_threshold() -> f64 {
    50.0
}

/// Default moderate-query policy: moderate queries stay on the fast path.
fn default_use_deep_for_moderate() -> bool {
    false
}

/// Default hard deadline for the fast retrieval path, in seconds.
fn default_fast_timeout_secs() -> f64 {
    5.0
}

/// Default hard deadline for the deep reasoning path, in seconds.
fn default_deep_timeout_secs() -> f64 {
    30.0
}

// ── OrchestratorConfig ─────────────────────────────────────────────────

/// Configuration for the routing orchestrator.
///
/// Controls how [`ComplexityAnalyzer`](crate::ComplexityAnalyzer) scores
/// map to an approach and how long each backend may run before its attempt
/// is abandoned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrchestratorConfig {
    /// Complexity score at or above which queries bucket as complex and
    /// route to the deep reasoning path.
    ///
    /// Range: `(0.0, 100.0)` exclusive. Default: `50.0`.
    #[serde(default = "default_complexity_threshold")]
    pub complexity_threshold: f64,

    /// Whether moderate-complexity queries take the deep path.
    /// Default: `false` (moderate stays fast).
    #[serde(default = "default_use_deep_for_moderate")]
    pub use_deep_for_moderate: bool,

    /// Hard deadline for a fast retrieval attempt, in seconds.
    /// Default: `5.0`.
    #[serde(default = "default_fast_timeout_secs")]
    pub fast_timeout_secs: f64,

    /// Hard deadline for a deep reasoning attempt, in seconds.
    /// Must be strictly greater than `fast_timeout_secs`: the fast path is
    /// never allowed to starve the deep path's budget. Default: `30.0`.
    #[serde(default = "default_deep_timeout_secs")]
    pub deep_timeout_secs: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            complexity_threshold: default_complexity_threshold(),
            use_deep_for_moderate: default_use_deep_for_moderate(),
            fast_timeout_secs: default_fast_timeout_secs(),
            deep_timeout_secs: default_deep_timeout_secs(),
        }
    }
}

impl OrchestratorConfig {
    /// Load a configuration from a TOML file.
    ///
    /// Missing fields fall back to the defaults. The loaded value is
    /// validated before being returned.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Io`] if the file cannot be read, or
    /// [`OrchestratorError::Config`] if it is not valid TOML or violates a
    /// constraint.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, OrchestratorError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| OrchestratorError::Config(format!("invalid config file: {e}")))?;
        config.validated()
    }

    /// The fast-path deadline as a [`Duration`].
    pub fn fast_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.fast_timeout_secs)
    }

    /// The deep-path deadline as a [`Duration`].
    pub fn deep_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.deep_timeout_secs)
    }

    /// Consume the config, returning it only if every constraint holds.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Config`] listing every violated
    /// constraint, one per line.
    pub fn validated(self) -> Result<Self, OrchestratorError> {
        let errors = validate(&self);
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(OrchestratorError::Config(errors.join("; ")))
        }
    }
}

/// Validate an [`OrchestratorConfig`], returning a list of human-readable
/// errors.
///
/// # Returns
///
/// An empty `Vec` on success, or one error string per violated constraint.
pub fn validate(config: &OrchestratorConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.complexity_threshold <= 0.0 || config.complexity_threshold >= 100.0 {
        errors.push(format!(
            "complexity_threshold must be in (0.0, 100.0), got {}",
            config.complexity_threshold
        ));
    }

    if !config.fast_timeout_secs.is_finite() || config.fast_timeout_secs <= 0.0 {
        errors.push(format!(
            "fast_timeout_secs must be a positive finite number, got {}",
            config.fast_timeout_secs
        ));
    }

    if !config.deep_timeout_secs.is_finite() || config.deep_timeout_secs <= 0.0 {
        errors.push(format!(
            "deep_timeout_secs must be a positive finite number, got {}",
            config.deep_timeout_secs
        ));
    }

    if config.fast_timeout_secs >= config.deep_timeout_secs {
        errors.push(format!(
            "fast_timeout_secs ({}) must be < deep_timeout_secs ({})",
            config.fast_timeout_secs, config.deep_timeout_secs
        ));
    }

    errors
}

// ── Tests ──────────────────────────────────────────────────────────────
