//! Runtime errors.
//!
//! [`EvalError`] is what the interpreter propagates; its `kind` names the
//! exception type the statement's code sees (`except KeyError:` matches on
//! it). Factory functions build the common errors with their standard
//! messages; all of them are `#[cold]`.
//!
//! [`ExecutionError`] is the frozen form handed to the worksheet once an
//! error escapes a statement.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use thiserror::Error;

use crate::value::Value;

/// Exception type of an [`EvalError`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Name,
    Type,
    Value,
    ZeroDivision,
    Index,
    Key,
    Attribute,
    Overflow,
    Assertion,
    Recursion,
    Runtime,
    /// A type named only by a `raise` statement.
    Raised(Arc<str>),
    /// Cancellation. Never matched by `except`.
    Interrupted,
}

/// Built-in exception type names, as bound in the builtin scope.
pub const BUILTIN_EXCEPTIONS: &[&str] = &[
    "ArithmeticError",
    "AssertionError",
    "AttributeError",
    "Exception",
    "IndexError",
    "KeyError",
    "LookupError",
    "NameError",
    "OverflowError",
    "RecursionError",
    "RuntimeError",
    "TypeError",
    "ValueError",
    "ZeroDivisionError",
];

impl ErrorKind {
    pub fn type_name(&self) -> &str {
        match self {
            ErrorKind::Name => "NameError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Value => "ValueError",
            ErrorKind::ZeroDivision => "ZeroDivisionError",
            ErrorKind::Index => "IndexError",
            ErrorKind::Key => "KeyError",
            ErrorKind::Attribute => "AttributeError",
            ErrorKind::Overflow => "OverflowError",
            ErrorKind::Assertion => "AssertionError",
            ErrorKind::Recursion => "RecursionError",
            ErrorKind::Runtime => "RuntimeError",
            ErrorKind::Raised(name) => name,
            ErrorKind::Interrupted => "KeyboardInterrupt",
        }
    }

    /// Kind for an exception type name.
    pub fn from_type_name(name: &str) -> ErrorKind {
        match name {
            "NameError" => ErrorKind::Name,
            "TypeError" => ErrorKind::Type,
            "ValueError" => ErrorKind::Value,
            "ZeroDivisionError" => ErrorKind::ZeroDivision,
            "IndexError" => ErrorKind::Index,
            "KeyError" => ErrorKind::Key,
            "AttributeError" => ErrorKind::Attribute,
            "OverflowError" => ErrorKind::Overflow,
            "AssertionError" => ErrorKind::Assertion,
            "RecursionError" => ErrorKind::Recursion,
            "RuntimeError" => ErrorKind::Runtime,
            other => ErrorKind::Raised(Arc::from(other)),
        }
    }

    /// Whether an `except <handler>:` clause catches this kind.
    pub fn is_caught_by(&self, handler: &str) -> bool {
        if *self == ErrorKind::Interrupted {
            return false;
        }
        let name = self.type_name();
        name == handler
            || matches!(handler, "Exception" | "BaseException" | "StandardError")
            || (handler == "LookupError" && matches!(self, ErrorKind::Index | ErrorKind::Key))
            || (handler == "ArithmeticError"
                && matches!(self, ErrorKind::ZeroDivision | ErrorKind::Overflow))
    }
}

/// One call frame of a traceback. `line` is zero-based within the text of
/// the statement that defined the function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub function: String,
    pub line: u32,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  line {}, in {}", self.line + 1, self.function)
    }
}

/// Error raised while evaluating a statement.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: ErrorKind,
    pub message: String,
    /// Function frames, outermost first.
    pub traceback: Vec<Frame>,
    /// The raised exception object, when user code raised one.
    pub value: Option<Value>,
}

impl EvalError {
    #[cold]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        EvalError {
            kind,
            message: message.into(),
            traceback: Vec::new(),
            value: None,
        }
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    pub fn is_interrupted(&self) -> bool {
        self.kind == ErrorKind::Interrupted
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str(self.type_name())
        } else {
            write!(f, "{}: {}", self.type_name(), self.message)
        }
    }
}

impl std::error::Error for EvalError {}

pub type EvalResult<T = Value> = Result<T, EvalError>;

// Factories

#[cold]
pub fn name_error(name: &str) -> EvalError {
    EvalError::new(ErrorKind::Name, format!("name '{name}' is not defined"))
}

#[cold]
pub fn type_error(message: impl Into<String>) -> EvalError {
    EvalError::new(ErrorKind::Type, message)
}

#[cold]
pub fn value_error(message: impl Into<String>) -> EvalError {
    EvalError::new(ErrorKind::Value, message)
}

#[cold]
pub fn unsupported_operands(op: &str, left: &str, right: &str) -> EvalError {
    type_error(format!(
        "unsupported operand type(s) for {op}: '{left}' and '{right}'"
    ))
}

#[cold]
pub fn division_by_zero(float: bool) -> EvalError {
    let message = if float {
        "float division by zero"
    } else {
        "integer division or modulo by zero"
    };
    EvalError::new(ErrorKind::ZeroDivision, message)
}

#[cold]
pub fn overflow(operation: &str) -> EvalError {
    EvalError::new(ErrorKind::Overflow, format!("integer overflow in {operation}"))
}

#[cold]
pub fn index_out_of_range(type_name: &str) -> EvalError {
    EvalError::new(ErrorKind::Index, format!("{type_name} index out of range"))
}

#[cold]
pub fn key_error(key_repr: String) -> EvalError {
    EvalError::new(ErrorKind::Key, key_repr)
}

#[cold]
pub fn no_attribute(type_name: &str, attr: &str) -> EvalError {
    EvalError::new(
        ErrorKind::Attribute,
        format!("'{type_name}' object has no attribute '{attr}'"),
    )
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    type_error(format!("'{type_name}' object is not callable"))
}

#[cold]
pub fn not_iterable(type_name: &str) -> EvalError {
    type_error(format!("'{type_name}' object is not iterable"))
}

#[cold]
pub fn not_subscriptable(type_name: &str) -> EvalError {
    type_error(format!("'{type_name}' object is not subscriptable"))
}

#[cold]
pub fn unhashable(type_name: &str) -> EvalError {
    type_error(format!("unhashable type: '{type_name}'"))
}

#[cold]
pub fn wrong_arg_count(name: &str, expected: usize, got: usize) -> EvalError {
    let noun = if expected == 1 { "argument" } else { "arguments" };
    type_error(format!("{name}() takes exactly {expected} {noun} ({got} given)"))
}

#[cold]
pub fn recursion_limit() -> EvalError {
    EvalError::new(ErrorKind::Recursion, "maximum recursion depth exceeded")
}

#[cold]
pub fn interrupted() -> EvalError {
    EvalError::new(ErrorKind::Interrupted, "Interrupted")
}

/// Identical consecutive traceback frames shown before collapsing.
const REPEAT_SHOWN: usize = 3;

/// An error that escaped a statement, frozen for display.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{type_name}: {value}")]
pub struct ExecutionError {
    /// Exception type name.
    pub type_name: String,
    /// Exception message.
    pub value: String,
    pub traceback: Vec<Frame>,
    /// Zero-based line of the statement text executing when the error
    /// escaped.
    pub line: u32,
}

impl ExecutionError {
    pub fn from_eval(err: EvalError, line: u32) -> Self {
        ExecutionError {
            type_name: err.type_name().to_owned(),
            value: err.message,
            traceback: err.traceback,
            line,
        }
    }

    /// Traceback lines followed by `Type: message`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.traceback.is_empty() {
            out.push_str("Traceback (most recent call last):\n");
            let mut i = 0;
            while i < self.traceback.len() {
                let frame = &self.traceback[i];
                let run = self.traceback[i..]
                    .iter()
                    .take_while(|f| *f == frame)
                    .count();
                for _ in 0..run.min(REPEAT_SHOWN) {
                    out.push_str(&frame.to_string());
                    out.push('\n');
                }
                if run > REPEAT_SHOWN {
                    let _ = writeln!(
                        out,
                        "  [Previous line repeated {} more times]",
                        run - REPEAT_SHOWN
                    );
                }
                i += run;
            }
        }
        out.push_str(&self.type_name);
        if !self.value.is_empty() {
            out.push_str(": ");
            out.push_str(&self.value);
        }
        out
    }
}

#[cfg(test)]
mod tests;
