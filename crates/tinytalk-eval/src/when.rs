//! When-handler dispatch.

use crate::error::{ExecResult, RuntimeError, RuntimeResult};
use crate::instance::InstanceId;
use crate::runtime::Runtime;
use tinytalk_types::ast::Action;
use tinytalk_types::Value;

/// Message reported by a handler that configures none.
pub const DEFAULT_WHEN_MESSAGE: &str = "When clause executed successfully";

impl Runtime {
    /// Run the when-handler `name` on an instance inside a transaction.
    ///
    /// Actions run in declaration order and the transaction always commits:
    /// a `set` naming an unknown field is skipped, and expressions that hit a
    /// type mismatch or an exhausted budget store `Null`. `args` are accepted
    /// for parameterized handlers but the core action set does not read them.
    #[tracing::instrument(skip(self, _args), fields(instance = %id))]
    pub fn execute_when(&mut self, id: InstanceId, name: &str, _args: &[Value]) -> ExecResult {
        match self.dispatch_when(id, name) {
            Ok(message) => ExecResult::success(message),
            Err(e) => {
                tracing::debug!("{e}");
                e.into()
            }
        }
    }

    fn dispatch_when(&mut self, id: InstanceId, name: &str) -> RuntimeResult<String> {
        let instance = self
            .instances
            .get_mut(id)
            .ok_or(RuntimeError::InstanceNotFound(id))?;
        let blueprint = self
            .blueprints
            .get(instance.blueprint())
            .ok_or(RuntimeError::InstanceNotFound(id))?;
        let handler = blueprint
            .when_handler(name)
            .ok_or_else(|| RuntimeError::HandlerNotFound(name.to_string()))?;

        instance.begin()?;

        for action in &handler.actions {
            match action {
                Action::Set { field, value, span } => {
                    let new_value = self.eval.eval_expr(value);
                    match blueprint.field_index(&field.name) {
                        Some(index) => {
                            instance.set_field(index, new_value);
                        }
                        None => {
                            tracing::trace!(
                                field = %field.name,
                                at = %span,
                                "set targets an undeclared field; value discarded"
                            );
                        }
                    }
                }
            }
        }

        instance.commit();

        Ok(handler
            .result
            .clone()
            .unwrap_or_else(|| DEFAULT_WHEN_MESSAGE.to_string()))
    }
}
