#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use reckon_parse::{compile, RewriteOptions};

use super::*;
use crate::errors::ErrorKind;
use crate::output::ResultItem;

fn interpreter_for(text: &str, globals: Scope) -> (Interpreter, Vec<Stmt>) {
    let program = compile(text, &RewriteOptions::default()).unwrap();
    let interpreter = InterpreterBuilder::new(globals)
        .recursion_limit(20)
        .lines(Arc::new(program.lines))
        .build();
    (interpreter, program.module.body)
}

fn run(text: &str) -> (Scope, Vec<String>) {
    let (mut interpreter, body) = interpreter_for(text, Scope::new());
    interpreter.run(&body).unwrap();
    let (scope, output) = interpreter.into_parts();
    let shown = output.finish().iter().map(ResultItem::display_text).collect();
    (scope, shown)
}

fn run_err(text: &str) -> (EvalError, u32) {
    let (mut interpreter, body) = interpreter_for(text, Scope::new());
    let err = interpreter.run(&body).unwrap_err();
    (err, interpreter.line())
}

#[test]
fn module_bindings_land_in_globals() {
    let (scope, shown) = run("a = 1\nb = a + 1\n");
    assert!(shown.is_empty());
    assert_eq!(scope.names(), vec!["a", "b"]);
    assert_eq!(scope.get("b").and_then(Value::as_int), Some(2));
}

#[test]
fn function_locals_stay_local() {
    let (scope, _) = run("def f():\n    inner = 1\n    return inner\nx = f()\n");
    assert!(scope.contains("x"));
    assert!(!scope.contains("inner"));
}

#[test]
fn line_tracks_the_failing_statement() {
    let (err, line) = run_err("a = 1\n\nb = missing\n");
    assert_eq!(err.kind, ErrorKind::Name);
    assert_eq!(line, 2);
}

#[test]
fn line_inside_a_compound_statement() {
    let (_, line) = run_err("for i in range(2):\n    x = i\n    y = 1 / 0\n");
    assert_eq!(line, 2);
}

#[test]
fn recursion_limit_is_configurable() {
    let (err, _) = run_err("def f():\n    return f()\nf()\n");
    assert_eq!(err.kind, ErrorKind::Recursion);
    assert_eq!(err.traceback.len(), 20);
}

#[test]
fn deep_recursion_within_the_limit_succeeds() {
    let program = compile(
        "def depth(n):\n    if n == 0:\n        return 0\n    return 1 + depth(n - 1)\nr = depth(900)\n",
        &RewriteOptions::default(),
    )
    .unwrap();
    let mut interpreter = InterpreterBuilder::new(Scope::new())
        .lines(Arc::new(program.lines))
        .build();
    interpreter.run(&program.module.body).unwrap();
    assert_eq!(interpreter.globals().get("r").and_then(Value::as_int), Some(900));
}

#[test]
fn traceback_frames_are_outermost_first() {
    let (err, _) = run_err("def a():\n    b()\ndef b():\n    1 / 0\na()\n");
    let names: Vec<_> = err.traceback.iter().map(|f| f.function.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(
        err.traceback.iter().map(|f| f.line).collect::<Vec<_>>(),
        vec![1, 3]
    );
}

#[test]
fn cancelled_token_interrupts() {
    let program = compile("x = 1", &RewriteOptions::default()).unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut interpreter = InterpreterBuilder::new(Scope::new()).cancel(cancel).build();
    let err = interpreter.run(&program.module.body).unwrap_err();
    assert!(err.is_interrupted());
    assert!(!interpreter.globals().contains("x"));
}

#[test]
fn warnings_are_results() {
    let mut interpreter = InterpreterBuilder::new(Scope::new()).build();
    interpreter.warn("careful");
    let (_, output) = interpreter.into_parts();
    let results = output.finish();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_warning());
}

#[test]
fn print_softspace_is_per_destination() {
    let (_, shown) = run("b = buffer()\nprint 'a',\nprint >>b, 'x',\nprint 'c'\n");
    assert_eq!(shown, vec!["a c"]);
}

#[test]
fn comprehension_variables_leak() {
    let (scope, _) = run("l = [i for i in range(3)]\n");
    assert_eq!(scope.get("i").and_then(Value::as_int), Some(2));
}
