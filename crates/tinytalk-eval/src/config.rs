//! Execution bounds.
//!
//! Configuration specifies limits only; enforcement is handled by the
//! [`Governor`](crate::Governor).

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Limits applied to evaluation.
///
/// `max_iterations` and `timeout_seconds` are carried for language
/// extensions and hosts; the core evaluator does not consult them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionBounds {
    /// Maximum loop iterations.
    pub max_iterations: u64,

    /// Maximum nesting depth of expression evaluation.
    ///
    /// Every binary operator counts one level, so this also limits plain
    /// source: with the default of 100, a chain like `a + b + ...` evaluates
    /// up to 101 terms and yields `null` from 102 terms on.
    pub max_recursion_depth: usize,

    /// Maximum evaluation steps over the runtime's lifetime.
    pub max_operations: u64,

    /// Wall-clock budget in seconds.
    pub timeout_seconds: f64,
}

impl Default for ExecutionBounds {
    fn default() -> Self {
        ExecutionBounds {
            max_iterations: 10_000,
            max_recursion_depth: 100,
            max_operations: 1_000_000,
            timeout_seconds: 30.0,
        }
    }
}

impl ExecutionBounds {
    /// Create bounds with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse bounds from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let bounds: ExecutionBounds = serde_json::from_str(json)?;
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.timeout_seconds.is_finite() || self.timeout_seconds < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "timeout_seconds must be a non-negative number, got {}",
                self.timeout_seconds
            )));
        }
        Ok(())
    }

    pub fn with_max_iterations(mut self, limit: u64) -> Self {
        self.max_iterations = limit;
        self
    }

    pub fn with_max_recursion_depth(mut self, limit: usize) -> Self {
        self.max_recursion_depth = limit;
        self
    }

    pub fn with_max_operations(mut self, limit: u64) -> Self {
        self.max_operations = limit;
        self
    }

    pub fn with_timeout_seconds(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}
