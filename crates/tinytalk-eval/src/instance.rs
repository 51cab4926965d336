//! Instances and the store that owns them.

use crate::blueprint::BlueprintId;
use serde::Serialize;
use std::fmt;
use tinytalk_types::Value;

/// Handle to a live instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InstanceId(pub usize);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Runtime object created from a blueprint.
///
/// Owns one value per blueprint field, in declaration order. While a
/// transaction is open it also owns a snapshot of those values; see
/// `transaction.rs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub(crate) id: InstanceId,
    pub(crate) blueprint: BlueprintId,
    pub(crate) fields: Vec<Value>,
    pub(crate) current_state: Option<String>,
    pub(crate) snapshot: Option<Vec<Value>>,
}

impl Instance {
    pub(crate) fn new(id: InstanceId, blueprint: BlueprintId, fields: Vec<Value>) -> Self {
        Self {
            id,
            blueprint,
            fields,
            current_state: None,
            snapshot: None,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn blueprint(&self) -> BlueprintId {
        self.blueprint
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }

    /// Replace the value at `index`, releasing the old one.
    ///
    /// Returns `false` when `index` is out of range; the value is dropped.
    pub fn set_field(&mut self, index: usize, value: Value) -> bool {
        match self.fields.get_mut(index) {
            Some(slot) => {
                slot.release();
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn current_state(&self) -> Option<&str> {
        self.current_state.as_deref()
    }
}

/// Live instances of one runtime, in creation order.
#[derive(Debug, Clone, Default)]
pub struct InstanceStore {
    instances: Vec<Instance>,
}

impl InstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of freshly initialized field values.
    pub fn insert(&mut self, blueprint: BlueprintId, fields: Vec<Value>) -> InstanceId {
        let id = InstanceId(self.instances.len());
        self.instances.push(Instance::new(id, blueprint, fields));
        id
    }

    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id.0)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.instances.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }

    /// Release every instance with its fields and any open snapshot.
    pub fn clear(&mut self) {
        self.instances.clear();
    }
}
