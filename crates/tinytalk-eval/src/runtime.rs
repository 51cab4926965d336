//! The runtime context object.
//!
//! Owns the variable environment, the resource governor, the blueprint
//! registry and the instance store. Every core operation goes through a
//! `&mut Runtime`; there is no ambient state.

use crate::blueprint::{Blueprint, BlueprintId, BlueprintRegistry};
use crate::config::ExecutionBounds;
use crate::error::{ExecResult, RuntimeError, RuntimeResult};
use crate::evaluator::Evaluator;
use crate::governor::{Diagnostic, Governor};
use crate::instance::{Instance, InstanceId, InstanceStore};
use tinytalk_types::ast::{Expr, Node};
use tinytalk_types::Value;

/// Message reported when `execute` registers a blueprint.
pub const BLUEPRINT_DEFINED_MESSAGE: &str = "Blueprint defined successfully";

/// One independent tinyTalk runtime.
#[derive(Debug, Default)]
pub struct Runtime {
    pub(crate) eval: Evaluator,
    pub(crate) blueprints: BlueprintRegistry,
    pub(crate) instances: InstanceStore,
}

impl Runtime {
    /// Create a runtime with default execution bounds.
    pub fn new() -> Self {
        Self::with_bounds(ExecutionBounds::default())
    }

    pub fn with_bounds(bounds: ExecutionBounds) -> Self {
        Self {
            eval: Evaluator::new(Governor::new(bounds)),
            blueprints: BlueprintRegistry::new(),
            instances: InstanceStore::new(),
        }
    }

    /// Tear the runtime down, releasing every variable, field and snapshot.
    pub fn shutdown(mut self) {
        tracing::debug!(
            blueprints = self.blueprints.len(),
            instances = self.instances.len(),
            variables = self.eval.env.len(),
            operations = self.eval.governor.operation_count(),
            "runtime shutdown"
        );
        self.instances.clear();
        self.blueprints.clear();
        self.eval.env.clear();
    }

    // ══════════════════════════════════════════════════════════════════════
    // Definitions
    // ══════════════════════════════════════════════════════════════════════

    /// Execute one top-level node. Only blueprint definitions are accepted.
    pub fn execute(&mut self, node: &Node) -> ExecResult {
        match self.define_blueprint(node) {
            Ok(_) => ExecResult::success(BLUEPRINT_DEFINED_MESSAGE),
            Err(e) => e.into(),
        }
    }

    /// Register the blueprint described by `node`.
    pub fn define_blueprint(&mut self, node: &Node) -> RuntimeResult<BlueprintId> {
        let id = self.blueprints.define(node)?;
        if let Some(bp) = self.blueprints.get(id) {
            tracing::debug!(
                name = bp.name(),
                %id,
                fields = bp.field_count(),
                whens = bp.whens().len(),
                "blueprint defined"
            );
        }
        Ok(id)
    }

    pub fn blueprint(&self, id: BlueprintId) -> Option<&Blueprint> {
        self.blueprints.get(id)
    }

    pub fn blueprints(&self) -> &BlueprintRegistry {
        &self.blueprints
    }

    // ══════════════════════════════════════════════════════════════════════
    // Instances
    // ══════════════════════════════════════════════════════════════════════

    /// Create an instance of the first blueprint registered as `name`.
    ///
    /// Field initializers run in declaration order against the variable
    /// environment only; they cannot see the instance's other fields.
    pub fn create_instance(&mut self, name: &str) -> RuntimeResult<InstanceId> {
        let bp_id = self
            .blueprints
            .lookup(name)
            .ok_or_else(|| RuntimeError::BlueprintNotFound(name.to_string()))?;
        let blueprint = self
            .blueprints
            .get(bp_id)
            .ok_or_else(|| RuntimeError::BlueprintNotFound(name.to_string()))?;

        let eval = &mut self.eval;
        let fields: Vec<Value> = blueprint
            .fields()
            .iter()
            .map(|field| eval.eval_expr(&field.initial))
            .collect();

        let id = self.instances.insert(bp_id, fields);
        tracing::debug!(blueprint = name, instance = %id, "instance created");
        Ok(id)
    }

    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id)
    }

    pub fn instances(&self) -> &InstanceStore {
        &self.instances
    }

    /// Field value by declaration index.
    pub fn field(&self, id: InstanceId, index: usize) -> Option<&Value> {
        self.instances.get(id)?.field(index)
    }

    /// Field value by name, resolved against the instance's blueprint.
    pub fn field_by_name(&self, id: InstanceId, name: &str) -> Option<&Value> {
        let instance = self.instances.get(id)?;
        let index = self.blueprints.get(instance.blueprint())?.field_index(name)?;
        instance.field(index)
    }

    /// Overwrite a field by declaration index, releasing the old value.
    ///
    /// Returns `false` when the blueprint has no field at `index`.
    pub fn set_field(&mut self, id: InstanceId, index: usize, value: Value) -> RuntimeResult<bool> {
        Ok(self.instance_mut(id)?.set_field(index, value))
    }

    /// Overwrite a field by name. Returns `false` for undeclared names.
    pub fn set_field_by_name(
        &mut self,
        id: InstanceId,
        name: &str,
        value: Value,
    ) -> RuntimeResult<bool> {
        let instance = self
            .instances
            .get_mut(id)
            .ok_or(RuntimeError::InstanceNotFound(id))?;
        let index = self
            .blueprints
            .get(instance.blueprint())
            .and_then(|bp| bp.field_index(name));
        Ok(match index {
            Some(index) => instance.set_field(index, value),
            None => false,
        })
    }

    /// Move an instance into one of its blueprint's declared states.
    pub fn transition(&mut self, id: InstanceId, state: &str) -> RuntimeResult<()> {
        let instance = self
            .instances
            .get_mut(id)
            .ok_or(RuntimeError::InstanceNotFound(id))?;
        let blueprint = self
            .blueprints
            .get(instance.blueprint())
            .ok_or(RuntimeError::InstanceNotFound(id))?;
        if !blueprint.declares_state(state) {
            return Err(RuntimeError::UnknownState {
                blueprint: blueprint.name().to_string(),
                state: state.to_string(),
            });
        }
        tracing::debug!(instance = %id, from = ?instance.current_state(), to = state, "state transition");
        instance.current_state = Some(state.to_string());
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Transactions
    // ══════════════════════════════════════════════════════════════════════

    pub fn begin(&mut self, id: InstanceId) -> RuntimeResult<()> {
        self.instance_mut(id)?.begin()
    }

    /// Returns whether a transaction was open.
    pub fn commit(&mut self, id: InstanceId) -> RuntimeResult<bool> {
        Ok(self.instance_mut(id)?.commit())
    }

    /// Returns whether a transaction was open and got rolled back.
    pub fn rollback(&mut self, id: InstanceId) -> RuntimeResult<bool> {
        Ok(self.instance_mut(id)?.rollback())
    }

    fn instance_mut(&mut self, id: InstanceId) -> RuntimeResult<&mut Instance> {
        self.instances
            .get_mut(id)
            .ok_or(RuntimeError::InstanceNotFound(id))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Variables & evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Copy of a global variable.
    pub fn get_variable(&self, name: &str) -> Option<Value> {
        self.eval.env.get(name)
    }

    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.eval.env.set(name, value);
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Value {
        self.eval.eval_expr(expr)
    }

    pub fn evaluate_condition(&mut self, expr: &Expr) -> bool {
        self.eval.evaluate_condition(expr)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Governor
    // ══════════════════════════════════════════════════════════════════════

    pub fn governor(&self) -> &Governor {
        &self.eval.governor
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.eval.governor.diagnostics()
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.eval.governor.take_diagnostics()
    }

    /// Start a fresh operation budget, e.g. before each top-level execution.
    pub fn reset_counters(&mut self) {
        self.eval.governor.reset();
    }

    // ══════════════════════════════════════════════════════════════════════
    // Program runs
    // ══════════════════════════════════════════════════════════════════════

    /// Define the blueprint in `node`, create one instance of it and run its
    /// first when-handler, if it has one.
    ///
    /// Reports the handler's result, or the definition result when there is
    /// no handler to run.
    pub fn run(&mut self, node: &Node) -> ExecResult {
        let defined = self.execute(node);
        let Node::Blueprint(decl) = node else {
            return defined;
        };
        if !defined.success {
            return defined;
        }

        let id = match self.create_instance(&decl.name.name) {
            Ok(id) => id,
            Err(e) => return e.into(),
        };
        let first_when = self
            .instance(id)
            .and_then(|inst| self.blueprints.get(inst.blueprint()))
            .and_then(|bp| bp.whens().first())
            .map(|w| w.name.clone());

        match first_when {
            Some(name) => self.execute_when(id, &name, &[]),
            None => defined,
        }
    }
}
