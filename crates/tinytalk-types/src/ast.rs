//! Syntax tree consumed by the tinyTalk runtime.
//!
//! Every node carries a [`Span`]. The parser is the usual producer; hosts that
//! need to synthesize a tree (REPL wrappers, stdlib blueprints, tests) use the
//! builder helpers, which attach [`Span::synthetic`].

use crate::{Span, Value};

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A top-level node handed to the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// `blueprint Name ...`
    Blueprint(BlueprintDecl),
    /// A bare expression. Not a definition; the runtime rejects it.
    Expr(Expr),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Blueprint(bp) => bp.span,
            Node::Expr(expr) => expr.span,
        }
    }
}

impl From<BlueprintDecl> for Node {
    fn from(decl: BlueprintDecl) -> Self {
        Node::Blueprint(decl)
    }
}

impl From<Expr> for Node {
    fn from(expr: Expr) -> Self {
        Node::Expr(expr)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ══════════════════════════════════════════════════════════════════════════════

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident::new(name, Span::synthetic())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Blueprints
// ══════════════════════════════════════════════════════════════════════════════

/// `blueprint Name` followed by fields, states and when-handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct BlueprintDecl {
    pub name: Ident,
    pub fields: Vec<FieldDecl>,
    pub states: Vec<StateDecl>,
    pub whens: Vec<WhenDecl>,
    pub span: Span,
}

impl BlueprintDecl {
    pub fn new(name: impl Into<Ident>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            states: Vec::new(),
            whens: Vec::new(),
            span: Span::synthetic(),
        }
    }

    /// Append `field name := initial`.
    pub fn field(mut self, name: impl Into<Ident>, initial: Expr) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            initial,
            span: Span::synthetic(),
        });
        self
    }

    /// Append `state name`.
    pub fn state(mut self, name: impl Into<Ident>) -> Self {
        self.states.push(StateDecl {
            name: name.into(),
            span: Span::synthetic(),
        });
        self
    }

    /// Append a when-handler.
    pub fn when(mut self, when: WhenDecl) -> Self {
        self.whens.push(when);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// `field name := initial`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: Ident,
    pub initial: Expr,
    pub span: Span,
}

/// `state name`
#[derive(Debug, Clone, PartialEq)]
pub struct StateDecl {
    pub name: Ident,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// When-handlers
// ══════════════════════════════════════════════════════════════════════════════

/// `when name` ... `finfr "message"`
#[derive(Debug, Clone, PartialEq)]
pub struct WhenDecl {
    pub name: Ident,
    pub actions: Vec<Action>,
    /// Message reported when the handler completes.
    pub result: Option<String>,
    pub span: Span,
}

impl WhenDecl {
    pub fn new(name: impl Into<Ident>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
            result: None,
            span: Span::synthetic(),
        }
    }

    /// Append `set field to value`.
    pub fn set(mut self, field: impl Into<Ident>, value: Expr) -> Self {
        self.actions.push(Action::Set {
            field: field.into(),
            value,
            span: Span::synthetic(),
        });
        self
    }

    pub fn result(mut self, message: impl Into<String>) -> Self {
        self.result = Some(message.into());
        self
    }
}

/// A statement inside a when-handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// `set field to value`
    Set {
        field: Ident,
        value: Expr,
        span: Span,
    },
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression with its span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Number, string, boolean, null or array literal.
    Literal(Value),
    /// Variable reference.
    Identifier(String),
    /// `left op right`
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(ExprKind::Literal(value.into()), Span::synthetic())
    }

    pub fn number(n: f64) -> Self {
        Self::literal(Value::Number(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::literal(Value::String(s.into()))
    }

    pub fn boolean(b: bool) -> Self {
        Self::literal(Value::Boolean(b))
    }

    pub fn null() -> Self {
        Self::literal(Value::Null)
    }

    pub fn array(items: Vec<Value>) -> Self {
        Self::literal(Value::Array(items))
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Identifier(name.into()), Span::synthetic())
    }

    pub fn binary(left: Expr, op: BinOp, right: Expr) -> Self {
        let span = left.span.merge(right.span);
        Self::new(
            ExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        )
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    /// `+` or `plus`: numeric sum, or space-joined text.
    Add,
    /// `&`: text fused without separator.
    Concat,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    /// Returns the operator symbol for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Concat => "&",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }
}
