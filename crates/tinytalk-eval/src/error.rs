//! Error and result types for the tinyTalk runtime.

use crate::instance::InstanceId;
use serde::Serialize;
use thiserror::Error;
use tinytalk_types::{Span, Value};

/// Structural failures: malformed input or lookups that miss.
///
/// Type mismatches and resource-bound violations inside expressions are not
/// errors; they resolve to `Null`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// `execute` was handed something other than a blueprint definition.
    #[error("{span}: expected a blueprint definition, found {found}")]
    NotABlueprint { found: &'static str, span: Span },

    #[error("blueprint '{0}' not found")]
    BlueprintNotFound(String),

    #[error("When clause '{0}' not found")]
    HandlerNotFound(String),

    #[error("instance {0} not found")]
    InstanceNotFound(InstanceId),

    #[error("blueprint '{blueprint}' declares no state '{state}'")]
    UnknownState { blueprint: String, state: String },

    /// `begin` on an instance whose transaction is still open.
    #[error("instance {0} already has an open transaction")]
    TransactionOpen(InstanceId),
}

/// Result alias for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors loading [`ExecutionBounds`](crate::ExecutionBounds).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed bounds configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid bounds configuration: {0}")]
    Invalid(String),
}

/// Outcome reported across the runtime boundary to the parser, stdlib and CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecResult {
    pub success: bool,
    pub message: String,
    pub value: Value,
}

impl ExecResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            value: Value::Null,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            value: Value::Null,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<RuntimeError> for ExecResult {
    fn from(err: RuntimeError) -> Self {
        ExecResult::failure(err.to_string())
    }
}
