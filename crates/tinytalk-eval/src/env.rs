//! Runtime-wide variable environment.

use std::collections::BTreeMap;
use tinytalk_types::Value;

/// Global name → value bindings for one runtime.
///
/// There is a single scope. `set` overwrites in place; `get` hands out a copy
/// so callers can mutate or release what they receive without touching the
/// stored binding.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: BTreeMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, releasing whatever value it held before.
    pub fn set(&mut self, name: &str, value: Value) {
        match self.bindings.get_mut(name) {
            Some(slot) => {
                slot.release();
                *slot = value;
            }
            None => {
                self.bindings.insert(name.to_string(), value);
            }
        }
    }

    /// Copy of the value bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).map(Value::copy)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Names currently bound, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Release every binding.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let mut env = Environment::new();
        env.set("x", Value::Number(1.0));
        assert_eq!(env.get("x"), Some(Value::Number(1.0)));
        assert_eq!(env.get("y"), None);
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut env = Environment::new();
        env.set("x", Value::from("first"));
        env.set("x", Value::from("second"));
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("x"), Some(Value::from("second")));
    }

    #[test]
    fn test_get_returns_copy() {
        let mut env = Environment::new();
        env.set("items", Value::Array(vec![Value::Number(1.0)]));

        let mut copy = env.get("items").unwrap();
        if let Value::Array(items) = &mut copy {
            items.push(Value::Number(2.0));
        }
        copy.release();

        assert_eq!(env.get("items"), Some(Value::Array(vec![Value::Number(1.0)])));
    }

    #[test]
    fn test_clear() {
        let mut env = Environment::new();
        env.set("a", Value::Null);
        env.set("b", Value::Boolean(true));
        assert_eq!(env.names().collect::<Vec<_>>(), vec!["a", "b"]);
        env.clear();
        assert!(env.is_empty());
        assert!(!env.contains("a"));
    }
}
