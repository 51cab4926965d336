//! Blueprint definitions and the registry that owns them.

use crate::error::{RuntimeError, RuntimeResult};
use std::collections::HashMap;
use std::fmt;
use tinytalk_types::ast::{Action, BlueprintDecl, Expr, Node};
use tinytalk_types::Span;

/// Handle to a registered blueprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlueprintId(pub usize);

impl fmt::Display for BlueprintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bp{}", self.0)
    }
}

/// A field and the expression that initializes it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub initial: Expr,
}

/// A named, ordered action list.
#[derive(Debug, Clone, PartialEq)]
pub struct WhenHandler {
    pub name: String,
    pub actions: Vec<Action>,
    pub result: Option<String>,
}

/// Immutable blueprint definition, copied out of the syntax tree at
/// registration so it does not borrow from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    name: String,
    fields: Vec<FieldDef>,
    states: Vec<String>,
    whens: Vec<WhenHandler>,
    span: Span,
}

impl Blueprint {
    pub fn from_decl(decl: &BlueprintDecl) -> Self {
        Self {
            name: decl.name.name.clone(),
            fields: decl
                .fields
                .iter()
                .map(|f| FieldDef {
                    name: f.name.name.clone(),
                    initial: f.initial.clone(),
                })
                .collect(),
            states: decl.states.iter().map(|s| s.name.name.clone()).collect(),
            whens: decl
                .whens
                .iter()
                .map(|w| WhenHandler {
                    name: w.name.name.clone(),
                    actions: w.actions.clone(),
                    result: w.result.clone(),
                })
                .collect(),
            span: decl.span,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn whens(&self) -> &[WhenHandler] {
        &self.whens
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Position of the first field called `name`.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// First when-handler called `name`.
    pub fn when_handler(&self, name: &str) -> Option<&WhenHandler> {
        self.whens.iter().find(|w| w.name == name)
    }

    pub fn declares_state(&self, name: &str) -> bool {
        self.states.iter().any(|s| s == name)
    }
}

/// Every blueprint defined during a runtime's lifetime, in definition order.
///
/// Redefining a name appends a new entry but lookups by name keep resolving
/// to the first one.
#[derive(Debug, Clone, Default)]
pub struct BlueprintRegistry {
    blueprints: Vec<Blueprint>,
    by_name: HashMap<String, BlueprintId>,
}

impl BlueprintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the blueprint described by `node`.
    pub fn define(&mut self, node: &Node) -> RuntimeResult<BlueprintId> {
        let decl = match node {
            Node::Blueprint(decl) => decl,
            Node::Expr(expr) => {
                return Err(RuntimeError::NotABlueprint {
                    found: "expression",
                    span: expr.span,
                })
            }
        };

        let id = BlueprintId(self.blueprints.len());
        self.blueprints.push(Blueprint::from_decl(decl));
        let first = *self.by_name.entry(decl.name.name.clone()).or_insert(id);
        if first != id {
            tracing::debug!(
                name = %decl.name.name,
                %first,
                "blueprint redefined; lookups keep resolving to the first definition"
            );
        }
        Ok(id)
    }

    pub fn get(&self, id: BlueprintId) -> Option<&Blueprint> {
        self.blueprints.get(id.0)
    }

    /// First blueprint registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<BlueprintId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlueprintId, &Blueprint)> {
        self.blueprints
            .iter()
            .enumerate()
            .map(|(i, bp)| (BlueprintId(i), bp))
    }

    pub fn clear(&mut self) {
        self.blueprints.clear();
        self.by_name.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinytalk_types::ast::WhenDecl;

    fn counter() -> BlueprintDecl {
        BlueprintDecl::new("Counter")
            .field("count", Expr::number(0.0))
            .field("step", Expr::number(1.0))
            .state("idle")
            .when(WhenDecl::new("bump").set("count", Expr::number(1.0)))
    }

    #[test]
    fn test_define_copies_decl() {
        let mut reg = BlueprintRegistry::new();
        let id = {
            let node = Node::Blueprint(counter());
            reg.define(&node).unwrap()
        };
        // The node is gone; the registry still has everything it needs.
        let bp = reg.get(id).unwrap();
        assert_eq!(bp.name(), "Counter");
        assert_eq!(bp.field_count(), 2);
        assert_eq!(bp.field_index("step"), Some(1));
        assert_eq!(bp.field_index("nope"), None);
        assert!(bp.declares_state("idle"));
        assert!(!bp.declares_state("busy"));
        assert!(bp.when_handler("bump").is_some());
        assert!(bp.when_handler("reset").is_none());
    }

    #[test]
    fn test_define_rejects_non_blueprint() {
        let mut reg = BlueprintRegistry::new();
        let err = reg.define(&Node::Expr(Expr::number(1.0))).unwrap_err();
        assert!(matches!(err, RuntimeError::NotABlueprint { found: "expression", .. }));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_redefinition_is_shadowed() {
        let mut reg = BlueprintRegistry::new();
        let first = reg.define(&Node::Blueprint(counter())).unwrap();
        let second = reg
            .define(&Node::Blueprint(BlueprintDecl::new("Counter")))
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.lookup("Counter"), Some(first));
        assert_eq!(reg.get(second).unwrap().field_count(), 0);
        let ids: Vec<_> = reg.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![first, second]);
    }
}
