use super::*;
use pretty_assertions::assert_eq;

#[test]
fn type_names_round_trip() {
    for name in BUILTIN_EXCEPTIONS {
        let kind = ErrorKind::from_type_name(name);
        assert_eq!(kind.type_name(), *name);
    }
}

#[test]
fn handler_matching() {
    assert!(ErrorKind::Key.is_caught_by("KeyError"));
    assert!(ErrorKind::Key.is_caught_by("LookupError"));
    assert!(ErrorKind::Key.is_caught_by("Exception"));
    assert!(!ErrorKind::Key.is_caught_by("IndexError"));
    assert!(ErrorKind::ZeroDivision.is_caught_by("ArithmeticError"));
    assert!(ErrorKind::from_type_name("Oops").is_caught_by("Oops"));
    assert!(!ErrorKind::Interrupted.is_caught_by("Exception"));
}

#[test]
fn messages() {
    assert_eq!(
        name_error("b").to_string(),
        "NameError: name 'b' is not defined"
    );
    assert_eq!(
        unsupported_operands("+", "int", "str").message,
        "unsupported operand type(s) for +: 'int' and 'str'"
    );
    assert_eq!(
        wrong_arg_count("f", 1, 2).message,
        "f() takes exactly 1 argument (2 given)"
    );
}

#[test]
fn render_with_traceback() {
    let err = ExecutionError {
        type_name: "ZeroDivisionError".into(),
        value: "integer division or modulo by zero".into(),
        traceback: vec![
            Frame {
                function: "f".into(),
                line: 1,
            },
            Frame {
                function: "g".into(),
                line: 4,
            },
        ],
        line: 0,
    };
    assert_eq!(
        err.render(),
        "Traceback (most recent call last):\n  line 2, in f\n  line 5, in g\nZeroDivisionError: integer division or modulo by zero"
    );
}

#[test]
fn render_without_message() {
    let err = ExecutionError::from_eval(EvalError::new(ErrorKind::Value, ""), 3);
    assert_eq!(err.render(), "ValueError");
    assert_eq!(err.line, 3);
}

#[test]
fn render_collapses_repeated_frames() {
    let frame = Frame {
        function: "f".into(),
        line: 1,
    };
    let err = ExecutionError {
        type_name: "RecursionError".into(),
        value: "maximum recursion depth exceeded".into(),
        traceback: vec![frame; 10],
        line: 0,
    };
    assert_eq!(
        err.render(),
        "Traceback (most recent call last):\n  line 2, in f\n  line 2, in f\n  line 2, in f\n  [Previous line repeated 7 more times]\nRecursionError: maximum recursion depth exceeded"
    );
}
