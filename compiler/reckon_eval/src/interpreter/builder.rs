//! `InterpreterBuilder` for creating [`Interpreter`] instances.

use std::sync::Arc;

use reckon_ir::LineMap;
use rustc_hash::FxHashMap;

use super::Interpreter;
use crate::cancel::CancelToken;
use crate::output::OutputCapture;
use crate::scope::Scope;

/// Default maximum depth of nested user-function calls.
pub const DEFAULT_RECURSION_LIMIT: usize = 1000;

/// Builder for [`Interpreter`].
#[derive(Debug)]
pub struct InterpreterBuilder {
    globals: Scope,
    output: Option<OutputCapture>,
    cancel: Option<CancelToken>,
    recursion_limit: usize,
    lines: Option<Arc<LineMap>>,
}

impl InterpreterBuilder {
    /// Start from the scope the statement runs in.
    pub fn new(globals: Scope) -> Self {
        InterpreterBuilder {
            globals,
            output: None,
            cancel: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            lines: None,
        }
    }

    #[must_use]
    pub fn output(mut self, output: OutputCapture) -> Self {
        self.output = Some(output);
        self
    }

    #[must_use]
    pub fn cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    #[must_use]
    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Line table of the statement text, for line numbers and tracebacks.
    #[must_use]
    pub fn lines(mut self, lines: Arc<LineMap>) -> Self {
        self.lines = Some(lines);
        self
    }

    pub fn build(self) -> Interpreter {
        Interpreter {
            globals: self.globals,
            output: self.output.unwrap_or_default(),
            cancel: self.cancel.unwrap_or_default(),
            recursion_limit: self.recursion_limit,
            lines: self
                .lines
                .unwrap_or_else(|| Arc::new(LineMap::new(""))),
            line: 0,
            frames: Vec::new(),
            softspace: FxHashMap::default(),
            handling: Vec::new(),
        }
    }
}
