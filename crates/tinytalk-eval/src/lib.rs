//! tinyTalk runtime.
//!
//! Evaluates blueprint definitions handed over by the parser, creates
//! instances from them and runs their when-handlers under begin/commit/rollback
//! transactions. A resource governor bounds every evaluation step.
//!
//! All state lives in a [`Runtime`] value; nothing is global, so independent
//! runtimes can coexist in one process.

mod blueprint;
mod config;
mod env;
mod error;
mod evaluator;
mod governor;
mod instance;
mod runtime;
mod transaction;
mod when;

pub use blueprint::{Blueprint, BlueprintId, BlueprintRegistry, FieldDef, WhenHandler};
pub use config::ExecutionBounds;
pub use env::Environment;
pub use error::{ConfigError, ExecResult, RuntimeError, RuntimeResult};
pub use evaluator::{apply_binary, Evaluator, Unsupported};
pub use governor::{BoundExceeded, Diagnostic, DiagnosticKind, Governor, MAX_DIAGNOSTICS};
pub use instance::{Instance, InstanceId, InstanceStore};
pub use runtime::{Runtime, BLUEPRINT_DEFINED_MESSAGE};
pub use when::DEFAULT_WHEN_MESSAGE;

pub use tinytalk_types::{ast, Span, Value};
