//! Runtime values.
//!
//! Scalars, strings and tuples are immutable and shared freely. Lists,
//! dicts, namespaces and buffers are [`Shared`] heap objects: cloning a
//! [`Value`] aliases them, and [`Value::shallow_copy`] duplicates the
//! container (not its elements). The execution chain depends on that
//! distinction: a statement's scope is a clone of its parent's, and only
//! the paths flagged as mutated are shallow-copied.
//!
//! # Locking
//!
//! Shared containers sit behind `parking_lot::Mutex`, which is not
//! reentrant. Code that walks a container while calling back into the
//! interpreter (or that may meet the same container twice, as in `a == a`)
//! takes a snapshot with [`Value::snapshot_items`] first and never holds a
//! guard across the walk.

mod dict;
mod format;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use reckon_ir::{FunctionDef, LineMap};
use rustc_hash::FxHashMap;

use crate::builtins::Builtin;
use crate::errors::{type_error, EvalResult};

pub use dict::{Dict, DictKey};
pub use format::{format_float_repr, format_float_str, repr_str};

/// Shared, mutable heap object.
pub type Shared<T> = Arc<Mutex<T>>;

/// Attribute bag created by `namespace(a=1)`.
pub type Namespace = BTreeMap<String, Value>;

/// Non-text output produced by a statement (for example by `html(...)`).
///
/// The worksheet renders custom results as a placeholder line; `text` is
/// used wherever plain text is required (doctests, the CLI).
pub trait CustomResult: Send + Sync + fmt::Debug {
    /// Short kind tag, such as `"html"`.
    fn kind(&self) -> &str;

    /// Plain-text rendering.
    fn text(&self) -> String;
}

/// A result holding an HTML fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HtmlResult {
    pub html: String,
}

impl CustomResult for HtmlResult {
    fn kind(&self) -> &str {
        "html"
    }

    fn text(&self) -> String {
        self.html.clone()
    }
}

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    /// 64-bit integer; arithmetic is checked.
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Tuple(Arc<[Value]>),
    List(Shared<Vec<Value>>),
    Dict(Shared<Dict>),
    Namespace(Shared<Namespace>),
    /// Text stream written by `print >>buf` or `buf.write(...)`.
    Buffer(Shared<String>),
    Function(Arc<FunctionValue>),
    Builtin(Builtin),
    BoundMethod(Arc<BoundMethod>),
    Type(ValueType),
    /// An exception class such as `ValueError`.
    ExceptionType(Arc<str>),
    /// An exception instance, as created by `ValueError("x")`.
    Exception(Arc<ExceptionValue>),
    Custom(Arc<dyn CustomResult>),
}

/// A user function.
///
/// Functions do not capture the module scope: free names resolve against
/// the globals of the statement that calls them. Functions defined inside
/// another function capture a snapshot of the enclosing locals.
#[derive(Debug)]
pub struct FunctionValue {
    pub def: Arc<FunctionDef>,
    /// Evaluated defaults, aligned with the trailing parameters.
    pub defaults: Vec<Value>,
    pub closure: Option<Arc<FxHashMap<String, Value>>>,
    /// Line table of the statement that defined the function, for
    /// tracebacks.
    pub lines: Arc<LineMap>,
}

impl FunctionValue {
    pub fn name(&self) -> &str {
        &self.def.name
    }
}

/// `receiver.name`, not yet called.
#[derive(Clone, Debug)]
pub struct BoundMethod {
    pub receiver: Value,
    pub name: Arc<str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExceptionValue {
    pub type_name: Arc<str>,
    pub message: String,
}

/// Builtin types that can be named, compared with `type(x)` and, for the
/// constructible ones, called.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    NoneType,
    Bool,
    Int,
    Float,
    Str,
    Tuple,
    List,
    Dict,
    Namespace,
    Buffer,
    Function,
    BuiltinFunction,
    Type,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::NoneType => "NoneType",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Str => "str",
            ValueType::Tuple => "tuple",
            ValueType::List => "list",
            ValueType::Dict => "dict",
            ValueType::Namespace => "namespace",
            ValueType::Buffer => "buffer",
            ValueType::Function => "function",
            ValueType::BuiltinFunction => "builtin_function_or_method",
            ValueType::Type => "type",
        }
    }

    /// Types bound as builtin names.
    pub const NAMED: &'static [ValueType] = &[
        ValueType::Bool,
        ValueType::Int,
        ValueType::Float,
        ValueType::Str,
        ValueType::Tuple,
        ValueType::List,
        ValueType::Dict,
    ];
}

// Factory methods

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(Mutex::new(items)))
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(items.into())
    }

    pub fn dict(dict: Dict) -> Self {
        Value::Dict(Arc::new(Mutex::new(dict)))
    }

    pub fn namespace(attrs: Namespace) -> Self {
        Value::Namespace(Arc::new(Mutex::new(attrs)))
    }

    pub fn buffer(text: impl Into<String>) -> Self {
        Value::Buffer(Arc::new(Mutex::new(text.into())))
    }

    pub fn exception(type_name: &str, message: impl Into<String>) -> Self {
        Value::Exception(Arc::new(ExceptionValue {
            type_name: Arc::from(type_name),
            message: message.into(),
        }))
    }

    pub fn custom(result: impl CustomResult + 'static) -> Self {
        Value::Custom(Arc::new(result))
    }
}

impl Value {
    /// Type name as reported in error messages and by `type(x)`.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Exception(e) => &e.type_name,
            Value::Custom(c) => c.kind(),
            Value::ExceptionType(_) => "type",
            other => other.value_type().name(),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::None => ValueType::NoneType,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Str(_) => ValueType::Str,
            Value::Tuple(_) => ValueType::Tuple,
            Value::List(_) => ValueType::List,
            Value::Dict(_) => ValueType::Dict,
            Value::Namespace(_) => ValueType::Namespace,
            Value::Buffer(_) => ValueType::Buffer,
            Value::Function(_) => ValueType::Function,
            Value::Builtin(_) | Value::BoundMethod(_) => ValueType::BuiltinFunction,
            Value::Type(_) | Value::ExceptionType(_) => ValueType::Type,
            // Instances of classes that are not builtin types; callers
            // use `type_name` for these.
            Value::Exception(_) | Value::Custom(_) => ValueType::Type,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::List(items) => !items.lock().is_empty(),
            Value::Dict(d) => !d.lock().is_empty(),
            _ => true,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            #[expect(clippy::cast_precision_loss, reason = "int to float promotion")]
            Value::Int(n) => Some(*n as f64),
            Value::Bool(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer argument, or a `TypeError` naming `what`.
    pub fn expect_int(&self, what: &str) -> EvalResult<i64> {
        self.as_int().ok_or_else(|| {
            type_error(format!(
                "{what} must be an integer, not '{}'",
                self.type_name()
            ))
        })
    }

    /// Element snapshot of a sequence, or `None` for non-sequences.
    ///
    /// Strings yield one-character strings and dicts yield their keys.
    pub fn snapshot_items(&self) -> Option<Vec<Value>> {
        match self {
            Value::Tuple(items) => Some(items.to_vec()),
            Value::List(items) => Some(items.lock().clone()),
            Value::Dict(d) => Some(d.lock().keys()),
            Value::Str(s) => Some(s.chars().map(|c| Value::string(c.to_string())).collect()),
            _ => None,
        }
    }

    /// Whether both values are the same object.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::Tuple(a), Value::Tuple(b)) => Arc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Arc::ptr_eq(a, b),
            (Value::Namespace(a), Value::Namespace(b)) => Arc::ptr_eq(a, b),
            (Value::Buffer(a), Value::Buffer(b)) => Arc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::ExceptionType(a), Value::ExceptionType(b)) => a == b,
            (Value::Exception(a), Value::Exception(b)) => Arc::ptr_eq(a, b),
            (Value::Custom(a), Value::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Value equality (`==`).
    pub fn equals(&self, other: &Value) -> bool {
        if self.is_same(other) {
            return true;
        }
        reckon_stack::with_stack(|| match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Tuple(_) | Value::List(_), Value::Tuple(_) | Value::List(_))
                if std::mem::discriminant(self) == std::mem::discriminant(other) =>
            {
                match (self.snapshot_items(), other.snapshot_items()) {
                    (Some(a), Some(b)) => {
                        a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| x.equals(y))
                    }
                    _ => false,
                }
            }
            (Value::Dict(a), Value::Dict(b)) => {
                let a = a.lock().clone();
                let b = b.lock().clone();
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).ok().flatten().is_some_and(|w| v.equals(&w)))
            }
            (Value::Namespace(a), Value::Namespace(b)) => {
                let a = a.lock().clone();
                let b = b.lock().clone();
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.equals(w)))
            }
            (Value::Exception(a), Value::Exception(b)) => a == b,
            _ => match (self.as_numeric(), other.as_numeric()) {
                (Some(Numeric::Int(a)), Some(Numeric::Int(b))) => a == b,
                (Some(a), Some(b)) => a.to_f64() == b.to_f64(),
                _ => false,
            },
        })
    }

    pub(crate) fn as_numeric(&self) -> Option<Numeric> {
        match self {
            Value::Int(n) => Some(Numeric::Int(*n)),
            Value::Bool(b) => Some(Numeric::Int(i64::from(*b))),
            Value::Float(f) => Some(Numeric::Float(*f)),
            _ => None,
        }
    }

    /// Shallow copy: mutable containers are duplicated, everything else is
    /// returned as is. Custom results cannot be copied.
    pub fn shallow_copy(&self) -> EvalResult {
        Ok(match self {
            Value::List(items) => Value::list(items.lock().clone()),
            Value::Dict(d) => Value::dict(d.lock().clone()),
            Value::Namespace(ns) => Value::namespace(ns.lock().clone()),
            Value::Buffer(buf) => Value::buffer(buf.lock().clone()),
            Value::Custom(c) => {
                return Err(type_error(format!(
                    "cannot copy '{}' object",
                    c.kind()
                )))
            }
            other => other.clone(),
        })
    }
}

/// Number operand after bool promotion.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    #[expect(clippy::cast_precision_loss, reason = "int to float promotion")]
    pub(crate) fn to_f64(self) -> f64 {
        match self {
            Numeric::Int(n) => n as f64,
            Numeric::Float(f) => f,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

#[cfg(test)]
mod tests;
