//! Per-instance transactions.
//!
//! An instance is either idle or open. `begin` snapshots every field value;
//! `commit` drops the snapshot and keeps the live values; `rollback` restores
//! the snapshot. The snapshot exists exactly while the transaction is open.

use crate::error::{RuntimeError, RuntimeResult};
use crate::instance::Instance;

impl Instance {
    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    /// idle → open.
    pub fn begin(&mut self) -> RuntimeResult<()> {
        if self.snapshot.is_some() {
            return Err(RuntimeError::TransactionOpen(self.id));
        }
        self.snapshot = Some(self.fields.clone());
        tracing::debug!(instance = %self.id, "transaction begin");
        Ok(())
    }

    /// open → idle, keeping the live field values.
    ///
    /// Returns `false` if no transaction was open.
    pub fn commit(&mut self) -> bool {
        let committed = self.snapshot.take().is_some();
        if committed {
            tracing::debug!(instance = %self.id, "transaction commit");
        }
        committed
    }

    /// open → idle, restoring the field values captured by `begin`.
    ///
    /// Returns `false`, changing nothing, if no transaction was open.
    pub fn rollback(&mut self) -> bool {
        match self.snapshot.take() {
            Some(snapshot) => {
                self.fields = snapshot;
                tracing::debug!(instance = %self.id, "transaction rollback");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::blueprint::BlueprintId;
    use crate::error::RuntimeError;
    use crate::instance::{Instance, InstanceId};
    use tinytalk_types::Value;

    fn instance() -> Instance {
        Instance::new(
            InstanceId(0),
            BlueprintId(0),
            vec![Value::Number(1.0), Value::from("a")],
        )
    }

    #[test]
    fn test_begin_snapshots_fields() {
        let mut inst = instance();
        inst.begin().unwrap();
        assert!(inst.in_transaction());
        assert_eq!(inst.snapshot.as_deref(), Some(inst.fields()));
    }

    #[test]
    fn test_begin_twice_is_refused() {
        let mut inst = instance();
        inst.begin().unwrap();
        inst.set_field(0, Value::Number(2.0));
        assert_eq!(inst.begin(), Err(RuntimeError::TransactionOpen(InstanceId(0))));
        // The first snapshot survives the refused begin.
        assert!(inst.rollback());
        assert_eq!(inst.field(0), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_commit_keeps_mutations() {
        let mut inst = instance();
        inst.begin().unwrap();
        inst.set_field(1, Value::from("b"));
        assert!(inst.commit());
        assert!(!inst.in_transaction());
        assert_eq!(inst.field(1), Some(&Value::from("b")));
    }

    #[test]
    fn test_rollback_restores_every_field() {
        let mut inst = instance();
        let before = inst.fields().to_vec();
        inst.begin().unwrap();
        inst.set_field(0, Value::Null);
        inst.set_field(1, Value::Array(vec![Value::Boolean(true)]));
        assert!(inst.rollback());
        assert!(!inst.in_transaction());
        assert_eq!(inst.fields(), before.as_slice());
    }

    #[test]
    fn test_rollback_after_commit_is_noop() {
        let mut inst = instance();
        inst.begin().unwrap();
        inst.set_field(0, Value::Number(9.0));
        inst.commit();
        assert!(!inst.rollback());
        assert_eq!(inst.field(0), Some(&Value::Number(9.0)));
    }

    #[test]
    fn test_commit_when_idle_is_noop() {
        let mut inst = instance();
        assert!(!inst.commit());
        assert!(!inst.in_transaction());
    }
}
