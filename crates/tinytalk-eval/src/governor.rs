//! Resource governor.
//!
//! Counts evaluation steps and nesting depth against [`ExecutionBounds`].
//! A violation never aborts the runtime: the evaluator turns it into `Null`
//! for the offending expression, and the governor records a [`Diagnostic`].

use crate::config::ExecutionBounds;
use serde::Serialize;
use thiserror::Error;

/// Maximum number of diagnostics retained; later ones are only counted.
pub const MAX_DIAGNOSTICS: usize = 64;

/// A bound the governor refused to let evaluation cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoundExceeded {
    #[error("maximum operations exceeded (limit {limit})")]
    Operations { limit: u64 },

    #[error("maximum recursion depth exceeded (limit {limit})")]
    RecursionDepth { limit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    OperationLimit,
    RecursionLimit,
}

/// A bound violation reported on the diagnostic channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl From<BoundExceeded> for Diagnostic {
    fn from(exceeded: BoundExceeded) -> Self {
        let kind = match exceeded {
            BoundExceeded::Operations { .. } => DiagnosticKind::OperationLimit,
            BoundExceeded::RecursionDepth { .. } => DiagnosticKind::RecursionLimit,
        };
        Diagnostic {
            kind,
            message: exceeded.to_string(),
        }
    }
}

/// Operation and depth counters for one runtime.
///
/// Counters accumulate for the lifetime of the runtime; call [`reset`] to
/// start a fresh budget.
///
/// [`reset`]: Governor::reset
#[derive(Debug, Clone)]
pub struct Governor {
    bounds: ExecutionBounds,
    operation_count: u64,
    recursion_depth: usize,
    diagnostics: Vec<Diagnostic>,
    dropped_diagnostics: usize,
}

impl Governor {
    pub fn new(bounds: ExecutionBounds) -> Self {
        Self {
            bounds,
            operation_count: 0,
            recursion_depth: 0,
            diagnostics: Vec::new(),
            dropped_diagnostics: 0,
        }
    }

    pub fn bounds(&self) -> &ExecutionBounds {
        &self.bounds
    }

    pub fn operation_count(&self) -> u64 {
        self.operation_count
    }

    pub fn recursion_depth(&self) -> usize {
        self.recursion_depth
    }

    /// Consume one evaluation step.
    pub fn tick(&mut self) -> Result<(), BoundExceeded> {
        self.operation_count += 1;
        if self.operation_count > self.bounds.max_operations {
            let exceeded = BoundExceeded::Operations {
                limit: self.bounds.max_operations,
            };
            self.report(exceeded);
            Err(exceeded)
        } else {
            Ok(())
        }
    }

    /// Descend one nesting level. Pair every `Ok` with [`exit`](Self::exit).
    pub fn enter(&mut self) -> Result<(), BoundExceeded> {
        if self.recursion_depth >= self.bounds.max_recursion_depth {
            let exceeded = BoundExceeded::RecursionDepth {
                limit: self.bounds.max_recursion_depth,
            };
            self.report(exceeded);
            return Err(exceeded);
        }
        self.recursion_depth += 1;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    /// Zero both counters. Recorded diagnostics are kept.
    pub fn reset(&mut self) {
        self.operation_count = 0;
        self.recursion_depth = 0;
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of diagnostics not retained because the log was full.
    pub fn dropped_diagnostics(&self) -> usize {
        self.dropped_diagnostics
    }

    /// Drain the diagnostic log.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.dropped_diagnostics = 0;
        std::mem::take(&mut self.diagnostics)
    }

    fn report(&mut self, exceeded: BoundExceeded) {
        tracing::warn!(
            operations = self.operation_count,
            depth = self.recursion_depth,
            "{exceeded}"
        );
        if self.diagnostics.len() < MAX_DIAGNOSTICS {
            self.diagnostics.push(exceeded.into());
        } else {
            self.dropped_diagnostics += 1;
        }
    }
}

impl Default for Governor {
    fn default() -> Self {
        Self::new(ExecutionBounds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_within_budget() {
        let mut g = Governor::new(ExecutionBounds::new().with_max_operations(3));
        assert!(g.tick().is_ok());
        assert!(g.tick().is_ok());
        assert!(g.tick().is_ok());
        assert_eq!(g.operation_count(), 3);
        assert!(g.diagnostics().is_empty());
    }

    #[test]
    fn test_tick_past_budget_reports() {
        let mut g = Governor::new(ExecutionBounds::new().with_max_operations(1));
        g.tick().unwrap();
        assert_eq!(g.tick(), Err(BoundExceeded::Operations { limit: 1 }));
        assert_eq!(g.diagnostics().len(), 1);
        assert_eq!(g.diagnostics()[0].kind, DiagnosticKind::OperationLimit);
        assert_eq!(
            g.diagnostics()[0].message,
            "maximum operations exceeded (limit 1)"
        );
    }

    #[test]
    fn test_enter_exit_depth() {
        let mut g = Governor::new(ExecutionBounds::new().with_max_recursion_depth(2));
        g.enter().unwrap();
        g.enter().unwrap();
        assert_eq!(g.enter(), Err(BoundExceeded::RecursionDepth { limit: 2 }));
        assert_eq!(g.recursion_depth(), 2);
        g.exit();
        g.exit();
        g.exit();
        assert_eq!(g.recursion_depth(), 0);
        assert_eq!(g.diagnostics()[0].kind, DiagnosticKind::RecursionLimit);
    }

    #[test]
    fn test_diagnostic_log_is_capped() {
        let mut g = Governor::new(ExecutionBounds::new().with_max_operations(0));
        for _ in 0..MAX_DIAGNOSTICS + 5 {
            let _ = g.tick();
        }
        assert_eq!(g.diagnostics().len(), MAX_DIAGNOSTICS);
        assert_eq!(g.dropped_diagnostics(), 5);

        let drained = g.take_diagnostics();
        assert_eq!(drained.len(), MAX_DIAGNOSTICS);
        assert!(g.diagnostics().is_empty());
        assert_eq!(g.dropped_diagnostics(), 0);
    }

    #[test]
    fn test_reset_restores_budget() {
        let mut g = Governor::new(ExecutionBounds::new().with_max_operations(1));
        g.tick().unwrap();
        assert!(g.tick().is_err());
        g.reset();
        assert_eq!(g.operation_count(), 0);
        assert!(g.tick().is_ok());
    }
}
