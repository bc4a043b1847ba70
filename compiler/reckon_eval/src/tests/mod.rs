//! End-to-end tests: statement text through [`ReckonEngine`].

#![allow(clippy::unwrap_used, reason = "Tests can panic")]

mod failures;
mod functions;

use crate::{
    CancelToken, Engine, EngineConfig, ExecuteFailure, Execution, ExecutionError, ReckonEngine,
    ResultItem, Scope,
};

fn engine() -> ReckonEngine {
    ReckonEngine::new(EngineConfig::builder().recursion_limit(100).build())
}

/// Execute `text` in a child of `parent`.
fn execute_in(parent: &Scope, text: &str) -> Result<Execution, ExecuteFailure> {
    let engine = engine();
    let program = engine.compile(text).unwrap();
    engine.execute(&program, parent, &CancelToken::new())
}

/// Scope left by running each statement in turn.
fn chain(statements: &[&str]) -> Scope {
    let mut scope = Scope::new();
    for text in statements {
        scope = execute_in(&scope, text).unwrap().scope;
    }
    scope
}

/// Displayed results of one statement run on an empty scope.
fn results(text: &str) -> Vec<String> {
    results_in(&Scope::new(), text)
}

fn results_in(parent: &Scope, text: &str) -> Vec<String> {
    execute_in(parent, text)
        .unwrap()
        .results
        .iter()
        .map(ResultItem::display_text)
        .collect()
}

/// The error a statement fails with.
fn failure(text: &str) -> ExecutionError {
    failure_in(&Scope::new(), text)
}

fn failure_in(parent: &Scope, text: &str) -> ExecutionError {
    match execute_in(parent, text) {
        Err(ExecuteFailure::Error(err)) => err,
        Err(ExecuteFailure::Interrupted) => panic!("interrupted: {text}"),
        Ok(execution) => panic!("no error from {text}: {:?}", execution.results),
    }
}
