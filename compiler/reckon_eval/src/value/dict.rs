use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::Value;
use crate::builtins::Builtin;
use crate::errors::{unhashable, EvalResult};
use crate::value::ValueType;

/// Hashable image of a dict key.
///
/// Numbers that compare equal hash equal: `True`, `1` and `1.0` are the
/// same key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DictKey {
    None,
    Int(i64),
    Float(u64),
    Str(Arc<str>),
    Tuple(Vec<DictKey>),
    Builtin(Builtin),
    Type(ValueType),
    ExceptionType(Arc<str>),
    /// Identity of a function, exception or custom result.
    Object(usize),
}

impl DictKey {
    pub fn from_value(value: &Value) -> EvalResult<DictKey> {
        Ok(match value {
            Value::None => DictKey::None,
            Value::Bool(b) => DictKey::Int(i64::from(*b)),
            Value::Int(n) => DictKey::Int(*n),
            Value::Float(f) => float_key(*f),
            Value::Str(s) => DictKey::Str(s.clone()),
            Value::Tuple(items) => DictKey::Tuple(
                items
                    .iter()
                    .map(DictKey::from_value)
                    .collect::<EvalResult<_>>()?,
            ),
            Value::Builtin(b) => DictKey::Builtin(*b),
            Value::Type(t) => DictKey::Type(*t),
            Value::ExceptionType(name) => DictKey::ExceptionType(name.clone()),
            Value::Function(f) => DictKey::Object(Arc::as_ptr(f) as usize),
            Value::Exception(e) => DictKey::Object(Arc::as_ptr(e) as usize),
            Value::Custom(c) => DictKey::Object(Arc::as_ptr(c).cast::<()>() as usize),
            Value::List(_)
            | Value::Dict(_)
            | Value::Namespace(_)
            | Value::Buffer(_)
            | Value::BoundMethod(_) => return Err(unhashable(value.type_name())),
        })
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::float_cmp,
    reason = "integral floats share the int key"
)]
fn float_key(f: f64) -> DictKey {
    if f.fract() == 0.0 && f.abs() < 9.0e18 {
        DictKey::Int(f as i64)
    } else {
        DictKey::Float(f.to_bits())
    }
}

/// Insertion-ordered dictionary.
#[derive(Clone, Debug, Default)]
pub struct Dict {
    entries: Vec<(Value, Value)>,
    index: FxHashMap<DictKey, usize>,
}

impl Dict {
    pub fn new() -> Self {
        Dict::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (Value, Value)>) -> EvalResult<Dict> {
        let mut dict = Dict::new();
        for (key, value) in pairs {
            dict.insert(key, value)?;
        }
        Ok(dict)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> EvalResult<Option<Value>> {
        let key = DictKey::from_value(key)?;
        Ok(self.index.get(&key).map(|&i| self.entries[i].1.clone()))
    }

    pub fn contains(&self, key: &Value) -> EvalResult<bool> {
        Ok(self.index.contains_key(&DictKey::from_value(key)?))
    }

    /// Insert or overwrite. An existing key keeps its position and its
    /// original key object.
    pub fn insert(&mut self, key: Value, value: Value) -> EvalResult<()> {
        let hashed = DictKey::from_value(&key)?;
        if let Some(&i) = self.index.get(&hashed) {
            self.entries[i].1 = value;
        } else {
            self.index.insert(hashed, self.entries.len());
            self.entries.push((key, value));
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &Value) -> EvalResult<Option<Value>> {
        let hashed = DictKey::from_value(key)?;
        let Some(i) = self.index.remove(&hashed) else {
            return Ok(None);
        };
        let (_, value) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Ok(Some(value))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> Vec<Value> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    /// `(key, value)` tuples in insertion order.
    pub fn items(&self) -> Vec<Value> {
        self.entries
            .iter()
            .map(|(k, v)| Value::tuple(vec![k.clone(), v.clone()]))
            .collect()
    }

    /// The first entry, removed.
    pub fn pop_first(&mut self) -> Option<(Value, Value)> {
        let key = self.entries.first()?.0.clone();
        let value = self.remove(&key).ok().flatten()?;
        Some((key, value))
    }
}
