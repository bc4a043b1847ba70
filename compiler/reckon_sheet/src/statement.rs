//! Statement chunks: text, compile/execute state and results.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use reckon_eval::{ExecuteFailure, Execution, ResultItem, Scope};
use reckon_lexer::StatementTokenStore;
use reckon_parse::{CompileError, Program};

use crate::layout::{LineStyle, ResultLine};

/// Where a statement is in its compile/execute lifecycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum StatementState {
    #[default]
    New,
    CompileSuccess,
    CompileError,
    Executing,
    ExecuteSuccess,
    ExecuteError,
    Interrupted,
}

impl fmt::Display for StatementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatementState::New => "new",
            StatementState::CompileSuccess => "compiled",
            StatementState::CompileError => "compile error",
            StatementState::Executing => "executing",
            StatementState::ExecuteSuccess => "ok",
            StatementState::ExecuteError => "error",
            StatementState::Interrupted => "interrupted",
        })
    }
}

/// Error shown in place of a statement's results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatementError {
    pub message: String,
    /// Zero-based line within the statement.
    pub line: Option<u32>,
    /// Byte column within `line`.
    pub offset: Option<u32>,
}

/// Output of a successful execution, as kept on the chunk.
#[derive(Debug)]
pub(crate) struct Executed {
    pub results: Vec<ResultItem>,
    pub scope: Arc<Scope>,
}

impl From<Execution> for Executed {
    fn from(execution: Execution) -> Self {
        Executed {
            results: execution.results,
            scope: Arc::new(execution.scope),
        }
    }
}

pub(crate) type ExecuteOutcome = Result<Executed, ExecuteFailure>;

/// One logical statement of the worksheet.
///
/// `needs_compile` and `needs_execute` are the dirty flags of the chain:
/// a statement with either set is re-run by the next calculation, and so
/// is every statement after it.
#[derive(Debug, Default)]
pub struct StatementChunk {
    tokens: StatementTokenStore,
    state: StatementState,
    needs_compile: bool,
    needs_execute: bool,
    pub(crate) status_changed: bool,
    pub(crate) results_changed: bool,
    program: Option<Arc<Program>>,
    results: Option<Vec<ResultItem>>,
    error: Option<StatementError>,
    result_scope: Option<Arc<Scope>>,
}

impl StatementChunk {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &StatementTokenStore {
        &self.tokens
    }

    pub fn text(&self) -> String {
        self.tokens.text()
    }

    pub fn state(&self) -> StatementState {
        self.state
    }

    pub fn needs_compile(&self) -> bool {
        self.needs_compile
    }

    pub fn needs_execute(&self) -> bool {
        self.needs_execute
    }

    /// The next calculation will run this statement.
    pub fn is_dirty(&self) -> bool {
        self.needs_compile || self.needs_execute
    }

    pub fn program(&self) -> Option<&Arc<Program>> {
        self.program.as_ref()
    }

    /// Results of the last successful execution. Kept while the text is
    /// edited, until the statement runs again.
    pub fn results(&self) -> Option<&[ResultItem]> {
        self.results.as_deref()
    }

    pub fn error(&self) -> Option<&StatementError> {
        self.error.as_ref()
    }

    /// Bindings after the last successful execution.
    pub fn result_scope(&self) -> Option<&Arc<Scope>> {
        self.result_scope.as_ref()
    }

    /// Replace the statement text. Returns the changed line span, relative
    /// to the statement, or `None` if nothing changed at all.
    pub(crate) fn set_lines(&mut self, lines: Vec<String>) -> Option<Range<usize>> {
        let changed = self.tokens.set_lines(lines)?;
        if !self.needs_compile {
            self.needs_compile = true;
            self.status_changed = true;
        }
        self.needs_execute = false;
        self.program = None;
        Some(changed)
    }

    /// Flag a compiled statement for re-execution after an upstream
    /// change. Returns `false` if it was already dirty or never compiled.
    pub(crate) fn mark_for_execute(&mut self) -> bool {
        if self.program.is_some() && !self.needs_execute {
            self.needs_execute = true;
            self.status_changed = true;
            true
        } else {
            false
        }
    }

    pub(crate) fn compiled(&mut self, result: Result<Program, CompileError>) {
        self.status_changed = true;
        match result {
            Ok(program) => {
                self.state = StatementState::CompileSuccess;
                self.program = Some(Arc::new(program));
                self.needs_compile = false;
                self.needs_execute = true;
            }
            Err(err) => {
                self.state = StatementState::CompileError;
                self.program = None;
                self.needs_compile = true;
                self.needs_execute = true;
                self.error = Some(StatementError {
                    message: err.to_string(),
                    line: Some(err.line()),
                    offset: err.offset(),
                });
                self.clear_results();
            }
        }
    }

    pub(crate) fn begin_execute(&mut self) {
        if self.state == StatementState::Executing {
            return;
        }
        self.state = StatementState::Executing;
        self.status_changed = true;
        self.error = None;
        self.clear_results();
    }

    pub(crate) fn executed(&mut self, outcome: ExecuteOutcome) {
        self.status_changed = true;
        self.needs_compile = false;
        match outcome {
            Ok(executed) => {
                self.state = StatementState::ExecuteSuccess;
                self.needs_execute = false;
                if self.results.as_ref() != Some(&executed.results) {
                    self.results_changed = true;
                }
                self.results = Some(executed.results);
                self.result_scope = Some(executed.scope);
                self.error = None;
            }
            Err(ExecuteFailure::Error(err)) => {
                self.state = StatementState::ExecuteError;
                self.needs_execute = true;
                self.error = Some(StatementError {
                    message: err.render(),
                    line: Some(err.line),
                    offset: None,
                });
                self.clear_results();
            }
            Err(ExecuteFailure::Interrupted) => {
                self.state = StatementState::Interrupted;
                self.needs_execute = true;
                self.error = Some(StatementError {
                    message: "Interrupted".to_owned(),
                    line: None,
                    offset: None,
                });
                self.clear_results();
            }
        }
    }

    fn clear_results(&mut self) {
        if self.results.take().is_some() {
            self.results_changed = true;
        }
        self.result_scope = None;
    }

    /// Lines shown below the statement: the error if there is one,
    /// otherwise one line per line of result text.
    pub fn result_lines(&self) -> Vec<ResultLine> {
        if let Some(error) = &self.error {
            return error
                .message
                .split('\n')
                .map(|text| ResultLine::new(text, LineStyle::Error))
                .collect();
        }
        let Some(results) = &self.results else {
            return Vec::new();
        };
        let mut lines = Vec::new();
        for item in results {
            match item {
                ResultItem::Text(text) => {
                    lines.extend(text.split('\n').map(|t| ResultLine::new(t, LineStyle::Text)));
                }
                ResultItem::Warning(message) => {
                    lines.extend(
                        message
                            .split('\n')
                            .map(|t| ResultLine::new(t, LineStyle::Warning)),
                    );
                }
                ResultItem::Custom(_) => {
                    lines.push(ResultLine::new(item.display_text(), LineStyle::Custom));
                }
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reckon_eval::{CancelToken, Engine, ReckonEngine};

    fn statement(text: &str) -> StatementChunk {
        let mut chunk = StatementChunk::new();
        chunk.set_lines(text.split('\n').map(str::to_owned).collect());
        chunk
    }

    fn run(chunk: &mut StatementChunk, parent: &Scope) {
        let engine = ReckonEngine::default();
        chunk.compiled(engine.compile(&chunk.text()));
        let program = chunk.program().cloned();
        if let Some(program) = program {
            chunk.begin_execute();
            let outcome = engine
                .execute(&program, parent, &CancelToken::new())
                .map(Executed::from);
            chunk.executed(outcome);
        }
    }

    fn texts(chunk: &StatementChunk) -> Vec<String> {
        chunk.result_lines().into_iter().map(|l| l.text).collect()
    }

    #[test]
    fn new_statement_needs_compile() {
        let chunk = statement("1 + 1");
        assert_eq!(chunk.state(), StatementState::New);
        assert!(chunk.needs_compile());
        assert!(!chunk.needs_execute());
        assert!(chunk.status_changed);
    }

    #[test]
    fn unchanged_text_is_not_dirtied() {
        let mut chunk = statement("x = 1");
        run(&mut chunk, &Scope::new());
        assert!(!chunk.is_dirty());
        assert_eq!(chunk.set_lines(vec!["x = 1".to_owned()]), None);
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn successful_run_keeps_scope() {
        let mut chunk = statement("x = 2\nx * 3");
        run(&mut chunk, &Scope::new());
        assert_eq!(chunk.state(), StatementState::ExecuteSuccess);
        assert_eq!(texts(&chunk), vec!["6"]);
        assert!(chunk.results_changed);
        assert!(chunk.result_scope().is_some_and(|s| s.contains("x")));
    }

    #[test]
    fn compile_error_shown_as_result() {
        let mut chunk = statement("1 +");
        run(&mut chunk, &Scope::new());
        assert_eq!(chunk.state(), StatementState::CompileError);
        assert!(chunk.needs_compile() && chunk.needs_execute());
        let lines = chunk.result_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].text.starts_with("SyntaxError: "));
        assert_eq!(lines[0].style, LineStyle::Error);
    }

    #[test]
    fn execute_error_clears_results_and_scope() {
        let mut chunk = statement("1");
        run(&mut chunk, &Scope::new());
        assert_eq!(texts(&chunk), vec!["1"]);

        chunk.set_lines(vec!["1 / 0".to_owned()]);
        // Stale results stay until the statement runs again.
        assert_eq!(texts(&chunk), vec!["1"]);

        run(&mut chunk, &Scope::new());
        assert_eq!(chunk.state(), StatementState::ExecuteError);
        assert_eq!(
            texts(&chunk),
            vec!["ZeroDivisionError: integer division or modulo by zero"]
        );
        assert!(chunk.result_scope().is_none());
        assert!(chunk.needs_execute());
        assert!(!chunk.needs_compile());
    }

    #[test]
    fn interrupted_is_retryable() {
        let mut chunk = statement("1");
        chunk.compiled(ReckonEngine::default().compile("1"));
        chunk.begin_execute();
        chunk.executed(Err(ExecuteFailure::Interrupted));
        assert_eq!(chunk.state(), StatementState::Interrupted);
        assert_eq!(texts(&chunk), vec!["Interrupted"]);
        assert!(chunk.needs_execute());
        assert!(chunk.program().is_some());
    }

    #[test]
    fn mark_for_execute_only_once() {
        let mut chunk = statement("1");
        assert!(!chunk.mark_for_execute());
        run(&mut chunk, &Scope::new());
        assert!(chunk.mark_for_execute());
        assert!(!chunk.mark_for_execute());
    }

    #[test]
    fn print_output_split_into_lines() {
        let mut chunk = statement("print 'a\\nb'\n'c'");
        run(&mut chunk, &Scope::new());
        assert_eq!(texts(&chunk), vec!["a", "b", "'c'"]);
    }
}
