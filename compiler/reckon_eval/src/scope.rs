//! Variable scopes of the execution chain.
//!
//! A [`Scope`] is the module-level binding table one statement runs in.
//! Deriving the next statement's scope is an explicit [`Scope::child`]
//! clone: bindings are duplicated, the values they point at are shared.
//! Heap objects that a statement may mutate in place are shallow-copied
//! separately, path by path, before the statement runs.

use rustc_hash::FxHashMap;

use crate::value::Value;

#[derive(Clone, Debug, Default)]
pub struct Scope {
    vars: FxHashMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    /// Input scope for the following statement.
    #[must_use]
    pub fn child(&self) -> Scope {
        self.clone()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.vars.remove(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Bound names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }
}
