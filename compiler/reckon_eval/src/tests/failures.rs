use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;
use crate::errors::Frame;

#[test]
fn errors_carry_type_message_and_line() {
    let err = failure("1 / 0");
    assert_eq!(err.type_name, "ZeroDivisionError");
    assert_eq!(err.value, "integer division or modulo by zero");
    assert_eq!(err.line, 0);
    assert!(err.traceback.is_empty());
    assert_eq!(
        err.render(),
        "ZeroDivisionError: integer division or modulo by zero"
    );

    let err = failure("x = 1\ny = z\n");
    assert_eq!(err.type_name, "NameError");
    assert_eq!(err.value, "name 'z' is not defined");
    assert_eq!(err.line, 1);
}

#[test]
fn runtime_error_messages() {
    assert_eq!(failure("[][1]").value, "list index out of range");
    assert_eq!(failure("{}['k']").value, "'k'");
    assert_eq!(
        failure("'a' < 1").value,
        "unorderable types: str() < int()"
    );
    assert_eq!(
        failure("1 + 'a'").value,
        "unsupported operand type(s) for +: 'int' and 'str'"
    );
    let err = failure("assert 1 == 2, 'nope'");
    assert_eq!((err.type_name.as_str(), err.value.as_str()), ("AssertionError", "nope"));
}

#[test]
fn tracebacks_name_the_function_frames() {
    let err = failure("def f():\n    return 1 / 0\nf()\n");
    assert_eq!(
        err.traceback,
        vec![Frame {
            function: "f".to_owned(),
            line: 1,
        }]
    );
    assert_eq!(err.line, 2);
    assert_eq!(
        err.render(),
        "Traceback (most recent call last):\n  line 2, in f\nZeroDivisionError: integer division or modulo by zero"
    );
}

#[test]
fn runaway_recursion_is_reported_and_collapsed() {
    let err = failure("def f(n):\n    return f(n + 1)\nf(0)\n");
    assert_eq!(err.type_name, "RecursionError");
    assert_eq!(err.value, "maximum recursion depth exceeded");
    let rendered = err.render();
    assert!(rendered.contains("[Previous line repeated"));
    assert_eq!(rendered.matches("in f").count(), 3);
}

#[test]
fn raising_named_exceptions() {
    let err = failure("raise Oops('bad')");
    assert_eq!((err.type_name.as_str(), err.value.as_str()), ("Oops", "bad"));
    let err = failure("raise ValueError");
    assert_eq!(err.render(), "ValueError");
    assert_eq!(failure("raise").value, "No active exception to reraise");
}

#[test]
fn try_except_finally() {
    let text = "try:\n    [][1]\nexcept IndexError as e:\n    print e\nfinally:\n    print 'cleanup'\n";
    assert_eq!(results(text), vec!["list index out of range", "cleanup"]);

    let text = "try:\n    {}[1]\nexcept (ValueError, LookupError):\n    'caught'\n";
    assert_eq!(results(text), vec!["'caught'"]);

    let text = "try:\n    raise Oops('x')\nexcept Exception as e:\n    e.message\n";
    assert_eq!(results(text), vec!["'x'"]);

    let text = "try:\n    pass\nexcept KeyError:\n    'no'\nelse:\n    'yes'\n";
    assert_eq!(results(text), vec!["'yes'"]);
}

#[test]
fn unmatched_handlers_propagate() {
    let err = failure("try:\n    1 / 0\nexcept KeyError:\n    pass\n");
    assert_eq!(err.type_name, "ZeroDivisionError");

    let err = failure("try:\n    1 / 0\nexcept ZeroDivisionError:\n    raise\n");
    assert_eq!(err.type_name, "ZeroDivisionError");
}

#[test]
fn cancelled_before_start() {
    let engine = engine();
    let program = engine.compile("1").unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();
    let outcome = engine.execute(&program, &Scope::new(), &cancel);
    assert!(matches!(outcome, Err(ExecuteFailure::Interrupted)));
}

#[test]
fn cancelling_stops_a_running_loop() {
    let engine = engine();
    let program = engine
        .compile("try:\n    while True:\n        pass\nexcept Exception:\n    'swallowed'\n")
        .unwrap();
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        trigger.cancel();
    });
    let outcome = engine.execute(&program, &Scope::new(), &cancel);
    handle.join().unwrap();
    assert!(matches!(outcome, Err(ExecuteFailure::Interrupted)));
}
