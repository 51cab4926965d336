//! Expression evaluator.

use crate::env::Environment;
use crate::governor::Governor;
use std::fmt;
use tinytalk_types::ast::{BinOp, Expr, ExprKind};
use tinytalk_types::Value;

/// An operator applied to operand types it has no rule for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unsupported {
    pub op: BinOp,
    pub left: &'static str,
    pub right: &'static str,
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot apply '{}' to {} and {}",
            self.op.as_str(),
            self.left,
            self.right
        )
    }
}

/// Tree-walking evaluator over expression nodes.
///
/// Evaluation never fails: type mismatches and bound violations yield `Null`.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    /// Global variable bindings.
    pub env: Environment,
    /// Operation and depth budget.
    pub governor: Governor,
}

impl Evaluator {
    pub fn new(governor: Governor) -> Self {
        Self {
            env: Environment::new(),
            governor,
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate an expression to a Value.
    pub fn eval_expr(&mut self, expr: &Expr) -> Value {
        if self.governor.tick().is_err() {
            return Value::Null;
        }
        match &expr.kind {
            ExprKind::Literal(value) => value.copy(),
            ExprKind::Identifier(name) => self.env.get(name).unwrap_or(Value::Null),
            ExprKind::Binary { left, op, right } => self.eval_binary(left, *op, right),
        }
    }

    /// `true` iff the expression yields `true` or a non-zero number.
    pub fn evaluate_condition(&mut self, expr: &Expr) -> bool {
        self.eval_expr(expr).is_truthy()
    }

    fn eval_binary(&mut self, left: &Expr, op: BinOp, right: &Expr) -> Value {
        if self.governor.enter().is_err() {
            return Value::Null;
        }
        // Both sides always run; there is no short-circuiting.
        let lv = self.eval_expr(left);
        let rv = self.eval_expr(right);
        self.governor.exit();

        match apply_binary(op, &lv, &rv) {
            Ok(value) => value,
            Err(unsupported) => {
                tracing::trace!(at = %left.span.merge(right.span), "{unsupported}");
                Value::Null
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════

/// Apply a binary operator to two evaluated operands.
pub fn apply_binary(op: BinOp, lv: &Value, rv: &Value) -> Result<Value, Unsupported> {
    match op {
        BinOp::Add => eval_add(lv, rv),
        BinOp::Concat => match (lv, rv) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
            _ => Err(unsupported(op, lv, rv)),
        },
        BinOp::Sub => eval_arith(op, lv, rv, |a, b| a - b),
        BinOp::Mul => eval_arith(op, lv, rv, |a, b| a * b),
        // Division by zero follows IEEE 754: inf or NaN, no trap.
        BinOp::Div => eval_arith(op, lv, rv, |a, b| a / b),
    }
}

fn eval_add(lv: &Value, rv: &Value) -> Result<Value, Unsupported> {
    match (lv, rv) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::String(_), _) | (_, Value::String(_)) => Ok(Value::String(format!(
            "{} {}",
            lv.as_str().unwrap_or(""),
            rv.as_str().unwrap_or("")
        ))),
        _ => Err(unsupported(BinOp::Add, lv, rv)),
    }
}

fn eval_arith(
    op: BinOp,
    lv: &Value,
    rv: &Value,
    f: fn(f64, f64) -> f64,
) -> Result<Value, Unsupported> {
    match (lv, rv) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(*a, *b))),
        _ => Err(unsupported(op, lv, rv)),
    }
}

fn unsupported(op: BinOp, lv: &Value, rv: &Value) -> Unsupported {
    Unsupported {
        op,
        left: lv.type_name(),
        right: rv.type_name(),
    }
}
