//! The compile/execute capability the worksheet runs statements through.
//!
//! [`Engine`] is the seam between the segmentation/chain machinery and the
//! embedded language: the worksheet only ever asks an engine to compile a
//! statement's text and to execute a compiled [`Program`] on top of a
//! parent [`Scope`]. [`ReckonEngine`] is the tree-walking implementation.

use std::fmt;
use std::sync::Arc;

use reckon_parse::{
    compile, CompileError, GetterPrefixes, MutatorHeuristic, Program, RewriteOptions,
};
use thiserror::Error;

use crate::builtins::builtin_names;
use crate::cancel::CancelToken;
use crate::errors::ExecutionError;
use crate::interpreter::{InterpreterBuilder, DEFAULT_RECURSION_LIMIT};
use crate::output::{OutputCapture, ResultItem};
use crate::scope::Scope;

/// A successful execution.
#[derive(Debug)]
pub struct Execution {
    pub results: Vec<ResultItem>,
    /// Bindings after the statement ran; the next statement's parent.
    pub scope: Scope,
}

/// Why an execution produced no scope.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExecuteFailure {
    #[error("{}", .0.render())]
    Error(ExecutionError),
    #[error("Interrupted")]
    Interrupted,
}

/// Compile and execute statements of the embedded language.
pub trait Engine: Send + Sync + fmt::Debug {
    fn compile(&self, text: &str) -> Result<Program, CompileError>;

    /// Run `program` in a child of `parent`. `parent` is never modified;
    /// mutated paths are shallow-copied into the child first.
    fn execute(
        &self,
        program: &Program,
        parent: &Scope,
        cancel: &CancelToken,
    ) -> Result<Execution, ExecuteFailure>;

    /// Names every statement can see without defining them.
    fn builtin_names(&self) -> Vec<&'static str>;
}

/// Interpreter settings.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    recursion_limit: usize,
    heuristic: Arc<dyn MutatorHeuristic>,
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    pub fn heuristic(&self) -> &Arc<dyn MutatorHeuristic> {
        &self.heuristic
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::builder().build()
    }
}

/// Consuming builder for [`EngineConfig`].
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    recursion_limit: Option<usize>,
    heuristic: Option<Arc<dyn MutatorHeuristic>>,
}

impl EngineConfigBuilder {
    /// Maximum depth of nested user-function calls.
    #[must_use]
    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = Some(limit);
        self
    }

    /// Method-name prefixes treated as non-mutating.
    #[must_use]
    pub fn getter_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.heuristic = Some(Arc::new(GetterPrefixes::new(prefixes)));
        self
    }

    #[must_use]
    pub fn heuristic(mut self, heuristic: Arc<dyn MutatorHeuristic>) -> Self {
        self.heuristic = Some(heuristic);
        self
    }

    pub fn build(self) -> EngineConfig {
        EngineConfig {
            recursion_limit: self.recursion_limit.unwrap_or(DEFAULT_RECURSION_LIMIT),
            heuristic: self
                .heuristic
                .unwrap_or_else(|| Arc::new(GetterPrefixes::default())),
        }
    }
}

/// Tree-walking [`Engine`].
#[derive(Clone, Debug, Default)]
pub struct ReckonEngine {
    config: EngineConfig,
}

impl ReckonEngine {
    pub fn new(config: EngineConfig) -> Self {
        ReckonEngine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Engine for ReckonEngine {
    #[tracing::instrument(level = "debug", skip_all)]
    fn compile(&self, text: &str) -> Result<Program, CompileError> {
        let options = RewriteOptions::default().with_heuristic(self.config.heuristic.clone());
        compile(text, &options)
    }

    #[tracing::instrument(level = "debug", skip_all)]
    fn execute(
        &self,
        program: &Program,
        parent: &Scope,
        cancel: &CancelToken,
    ) -> Result<Execution, ExecuteFailure> {
        let lines = Arc::new(program.lines.clone());
        let mut interpreter = InterpreterBuilder::new(parent.child())
            .output(OutputCapture::new())
            .cancel(cancel.clone())
            .recursion_limit(self.config.recursion_limit)
            .lines(lines)
            .build();

        for mutation in &program.mutations {
            if !interpreter.globals().contains(&mutation.root) {
                continue;
            }
            if let Err(err) = interpreter.run(std::slice::from_ref(&mutation.copy_code)) {
                if err.is_interrupted() {
                    return Err(ExecuteFailure::Interrupted);
                }
                tracing::warn!(path = %mutation.description, error = %err, "copy failed");
                interpreter.warn(format!(
                    "'{}' apparently modified, but can't copy it",
                    mutation.description
                ));
            }
        }

        let outcome = interpreter.run(&program.module.body);
        let line = interpreter.line();
        match outcome {
            Ok(()) => {
                let (scope, output) = interpreter.into_parts();
                let results = output.finish();
                tracing::debug!(results = results.len(), "executed statement");
                Ok(Execution { results, scope })
            }
            Err(err) if err.is_interrupted() => Err(ExecuteFailure::Interrupted),
            Err(err) => {
                tracing::debug!(error = %err, line, "statement raised");
                Err(ExecuteFailure::Error(ExecutionError::from_eval(err, line)))
            }
        }
    }

    fn builtin_names(&self) -> Vec<&'static str> {
        builtin_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.recursion_limit(), 1000);
        assert!(!config.heuristic().is_mutator("getValue"));
        assert!(config.heuristic().is_mutator("append"));
    }

    #[test]
    fn builder_overrides() {
        let config = EngineConfig::builder()
            .recursion_limit(50)
            .getter_prefixes(["peek"])
            .build();
        assert_eq!(config.recursion_limit(), 50);
        assert!(!config.heuristic().is_mutator("peek_front"));
        assert!(config.heuristic().is_mutator("get"));
    }
}
