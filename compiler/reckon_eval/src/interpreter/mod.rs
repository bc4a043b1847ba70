//! Tree-walking interpreter for one worksheet statement.
//!
//! An [`Interpreter`] owns the statement's module scope and its
//! [`OutputCapture`] for the duration of one execution; the engine takes
//! both back with [`Interpreter::into_parts`].
//!
//! # Frames
//!
//! Module-level code reads and writes the statement scope directly. Each
//! user function call pushes a [`CallFrame`] with its own locals; free
//! names resolve locals, then the captured closure, then the statement
//! scope, then the builtins. Functions do not keep a reference to the scope
//! they were defined in, so a function defined by an earlier statement sees
//! the globals of whichever statement calls it.
//!
//! # Errors
//!
//! Control flow that leaves a suite early travels as [`Unwind`]. Runtime
//! errors collect one traceback [`Frame`] per user function they escape.
//! The cancellation token is polled before every statement, loop iteration
//! and call.

mod builder;
mod call;
mod expr;
mod stmt;

pub use builder::{InterpreterBuilder, DEFAULT_RECURSION_LIMIT};

use std::sync::Arc;

use reckon_ir::{LineMap, Span, Stmt};
use rustc_hash::FxHashMap;

use crate::builtins::lookup_builtin;
use crate::cancel::CancelToken;
use crate::errors::{interrupted, name_error, EvalError, EvalResult, Frame};
use crate::output::OutputCapture;
use crate::scope::Scope;
use crate::value::Value;

/// Non-local exit from a suite.
#[derive(Debug)]
pub(crate) enum Unwind {
    Break,
    Continue,
    Return(Value),
    Error(EvalError),
}

impl From<EvalError> for Unwind {
    fn from(err: EvalError) -> Self {
        Unwind::Error(err)
    }
}

pub(crate) type ExecResult = Result<(), Unwind>;

/// Locals of one active user-function call.
#[derive(Debug)]
pub(crate) struct CallFrame {
    name: String,
    locals: FxHashMap<String, Value>,
    closure: Option<Arc<FxHashMap<String, Value>>>,
    lines: Arc<LineMap>,
    /// Zero-based line currently executing, within `lines`.
    line: u32,
}

pub struct Interpreter {
    globals: Scope,
    output: OutputCapture,
    cancel: CancelToken,
    recursion_limit: usize,
    /// Line table of the statement being executed.
    lines: Arc<LineMap>,
    /// Zero-based line of the module-level statement executing.
    line: u32,
    frames: Vec<CallFrame>,
    /// `print` soft-space state per destination.
    softspace: FxHashMap<usize, bool>,
    /// Exceptions being handled, innermost last, for bare `raise`.
    handling: Vec<EvalError>,
}

impl Interpreter {
    /// Execute a statement body at module level.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn run(&mut self, body: &[Stmt]) -> EvalResult<()> {
        match self.exec_suite(body) {
            Ok(()) => Ok(()),
            Err(Unwind::Error(err)) => Err(err),
            // Rejected by the parser outside loops and functions.
            Err(Unwind::Break | Unwind::Continue | Unwind::Return(_)) => Ok(()),
        }
    }

    /// Zero-based line of the module-level statement that ran last.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Take back the statement scope and the captured output.
    pub fn into_parts(self) -> (Scope, OutputCapture) {
        (self.globals, self.output)
    }

    pub fn globals(&self) -> &Scope {
        &self.globals
    }

    /// Append a warning to the statement's results.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.output.warning(message.into());
    }

    pub(crate) fn check_cancelled(&self) -> EvalResult<()> {
        if self.cancel.is_cancelled() {
            Err(interrupted())
        } else {
            Ok(())
        }
    }

    /// Record the line of the statement about to run.
    pub(crate) fn mark_line(&mut self, span: Span) {
        match self.frames.last_mut() {
            Some(frame) => frame.line = frame.lines.line(span.start),
            None => self.line = self.lines.line(span.start),
        }
    }

    pub(crate) fn lookup(&self, name: &str) -> EvalResult {
        if let Some(frame) = self.frames.last() {
            if let Some(v) = frame.locals.get(name) {
                return Ok(v.clone());
            }
            if let Some(v) = frame.closure.as_ref().and_then(|c| c.get(name)) {
                return Ok(v.clone());
            }
        }
        if let Some(v) = self.globals.get(name) {
            return Ok(v.clone());
        }
        lookup_builtin(name).ok_or_else(|| name_error(name))
    }

    pub(crate) fn bind(&mut self, name: &str, value: Value) {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.locals.insert(name.to_owned(), value);
            }
            None => self.globals.set(name, value),
        }
    }

    pub(crate) fn unbind(&mut self, name: &str) -> EvalResult<()> {
        let removed = match self.frames.last_mut() {
            Some(frame) => frame.locals.remove(name),
            None => self.globals.remove(name),
        };
        removed.map(|_| ()).ok_or_else(|| name_error(name))
    }

    /// Names visible from the current frame, excluding builtins.
    pub(crate) fn visible_locals(&self) -> Option<FxHashMap<String, Value>> {
        let frame = self.frames.last()?;
        let mut visible = frame
            .closure
            .as_deref()
            .cloned()
            .unwrap_or_default();
        visible.extend(frame.locals.iter().map(|(k, v)| (k.clone(), v.clone())));
        Some(visible)
    }

    /// Line table that spans of the running code refer to.
    pub(crate) fn current_lines(&self) -> Arc<LineMap> {
        self.frames
            .last()
            .map_or_else(|| self.lines.clone(), |f| f.lines.clone())
    }

    fn push_traceback(err: &mut EvalError, frame: &CallFrame) {
        err.traceback.insert(
            0,
            Frame {
                function: frame.name.clone(),
                line: frame.line,
            },
        );
    }
}

#[cfg(test)]
mod tests;
