//! Reckon Eval - interpreter and execution engine for worksheet statements.
//!
//! # Architecture
//!
//! - [`Engine`]: the compile/execute capability the worksheet drives;
//!   [`ReckonEngine`] is the implementation.
//! - [`Interpreter`]: walks one statement's rewritten tree against a
//!   [`Scope`], capturing results in an [`OutputCapture`].
//! - `evaluate_binary` / `evaluate_unary`: enum-based operator dispatch.
//! - `call_builtin` / `call_method`: enum- and table-based dispatch for
//!   builtin functions and the methods of builtin types.
//! - [`Value`]: runtime values; containers are shared and interior-mutable.
//!
//! Every statement runs in a fresh child of its predecessor's scope. Values
//! that the statement may mutate in place are shallow-copied into the child
//! first, so re-running a later statement never observes the effects of a
//! previous run of itself.

pub mod builtins;
mod cancel;
mod engine;
pub mod errors;
pub mod interpreter;
mod methods;
pub mod operators;
mod output;
mod scope;
mod string_format;
pub mod value;

pub use cancel::CancelToken;
pub use engine::{
    Engine, EngineConfig, EngineConfigBuilder, ExecuteFailure, Execution, ReckonEngine,
};
pub use errors::{ErrorKind, EvalError, EvalResult, ExecutionError, Frame};
pub use interpreter::{Interpreter, InterpreterBuilder, DEFAULT_RECURSION_LIMIT};
pub use methods::{call_method, has_method, method_names};
pub use output::{OutputCapture, ResultItem};
pub use scope::Scope;
pub use string_format::percent_format;
pub use value::{CustomResult, HtmlResult, Value, ValueType};

#[cfg(test)]
mod tests;
