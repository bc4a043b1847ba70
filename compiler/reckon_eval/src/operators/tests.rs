#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;

fn bin(a: Value, op: BinaryOp, b: Value) -> String {
    evaluate_binary(&a, &b, op).unwrap().repr()
}

fn bin_err(a: Value, op: BinaryOp, b: Value) -> String {
    evaluate_binary(&a, &b, op).unwrap_err().to_string()
}

#[test]
fn integer_division_floors() {
    assert_eq!(bin(Value::Int(7), BinaryOp::Div, Value::Int(2)), "3");
    assert_eq!(bin(Value::Int(-7), BinaryOp::Div, Value::Int(2)), "-4");
    assert_eq!(bin(Value::Int(-7), BinaryOp::FloorDiv, Value::Int(2)), "-4");
    assert_eq!(bin(Value::Float(7.0), BinaryOp::Div, Value::Int(2)), "3.5");
}

#[test]
fn modulo_takes_divisor_sign() {
    assert_eq!(bin(Value::Int(-7), BinaryOp::Mod, Value::Int(3)), "2");
    assert_eq!(bin(Value::Int(7), BinaryOp::Mod, Value::Int(-3)), "-2");
    assert_eq!(bin(Value::Float(-1.0), BinaryOp::Mod, Value::Float(3.0)), "2.0");
}

#[test]
fn division_by_zero_messages() {
    assert_eq!(
        bin_err(Value::Int(1), BinaryOp::Div, Value::Int(0)),
        "ZeroDivisionError: integer division or modulo by zero"
    );
    assert_eq!(
        bin_err(Value::Float(1.0), BinaryOp::Div, Value::Int(0)),
        "ZeroDivisionError: float division by zero"
    );
}

#[test]
fn overflow_is_an_error() {
    assert_eq!(
        bin_err(Value::Int(i64::MAX), BinaryOp::Add, Value::Int(1)),
        "OverflowError: integer overflow in +"
    );
    assert_eq!(
        bin_err(Value::Int(1), BinaryOp::LShift, Value::Int(64)),
        "OverflowError: integer overflow in <<"
    );
    assert_eq!(bin(Value::Int(1), BinaryOp::LShift, Value::Int(10)), "1024");
}

#[test]
fn powers() {
    assert_eq!(bin(Value::Int(2), BinaryOp::Pow, Value::Int(10)), "1024");
    assert_eq!(bin(Value::Int(2), BinaryOp::Pow, Value::Int(-1)), "0.5");
    assert_eq!(bin(Value::Float(4.0), BinaryOp::Pow, Value::Float(0.5)), "2.0");
}

#[test]
fn sequences() {
    assert_eq!(bin(Value::from("ab"), BinaryOp::Add, Value::from("c")), "'abc'");
    assert_eq!(bin(Value::from("ab"), BinaryOp::Mul, Value::Int(2)), "'abab'");
    assert_eq!(bin(Value::Int(2), BinaryOp::Mul, Value::from("x")), "'xx'");
    assert_eq!(
        bin(
            Value::list(vec![Value::Int(1)]),
            BinaryOp::Add,
            Value::list(vec![Value::Int(2)])
        ),
        "[1, 2]"
    );
    assert_eq!(
        bin(Value::tuple(vec![Value::Int(0)]), BinaryOp::Mul, Value::Int(3)),
        "(0, 0, 0)"
    );
    assert_eq!(bin(Value::from("%d%%"), BinaryOp::Mod, Value::Int(5)), "'5%'");
}

#[test]
fn type_mismatch() {
    assert_eq!(
        bin_err(Value::Int(1), BinaryOp::Add, Value::from("a")),
        "TypeError: unsupported operand type(s) for +: 'int' and 'str'"
    );
    assert_eq!(
        bin_err(Value::Float(1.0), BinaryOp::BitAnd, Value::Int(1)),
        "TypeError: unsupported operand type(s) for &: 'float' and 'int'"
    );
}

#[test]
fn bool_bit_ops_stay_bool() {
    assert_eq!(bin(Value::Bool(true), BinaryOp::BitAnd, Value::Bool(false)), "False");
    assert_eq!(bin(Value::Bool(true), BinaryOp::Add, Value::Bool(true)), "2");
}

#[test]
fn unary() {
    assert_eq!(evaluate_unary(UnaryOp::Neg, &Value::Int(3)).unwrap().repr(), "-3");
    assert_eq!(evaluate_unary(UnaryOp::Not, &Value::Int(0)).unwrap().repr(), "True");
    assert_eq!(evaluate_unary(UnaryOp::Invert, &Value::Int(0)).unwrap().repr(), "-1");
    assert_eq!(
        evaluate_unary(UnaryOp::Neg, &Value::from("a"))
            .unwrap_err()
            .message,
        "bad operand type for unary -: 'str'"
    );
}

#[test]
fn comparisons() {
    let lt = |a: Value, b: Value| evaluate_compare(CmpOp::Lt, &a, &b).unwrap();
    assert!(lt(Value::Int(1), Value::Float(1.5)));
    assert!(lt(Value::from("a"), Value::from("b")));
    assert!(lt(
        Value::tuple(vec![Value::Int(1), Value::Int(2)]),
        Value::tuple(vec![Value::Int(1), Value::Int(3)])
    ));
    assert!(lt(Value::list(vec![]), Value::list(vec![Value::Int(0)])));
    assert!(evaluate_compare(CmpOp::Lt, &Value::Int(1), &Value::from("a")).is_err());
}

#[test]
fn membership() {
    let list = Value::list(vec![Value::Int(1), Value::from("a")]);
    assert!(contains(&list, &Value::Float(1.0)).unwrap());
    assert!(!contains(&list, &Value::Int(2)).unwrap());
    assert!(contains(&Value::from("hello"), &Value::from("ell")).unwrap());
    assert!(contains(&Value::Int(1), &Value::Int(1)).is_err());
}

#[test]
fn identity() {
    let list = Value::list(vec![]);
    assert!(evaluate_compare(CmpOp::Is, &list, &list.clone()).unwrap());
    assert!(evaluate_compare(CmpOp::IsNot, &list, &Value::list(vec![])).unwrap());
    assert!(evaluate_compare(CmpOp::Is, &Value::None, &Value::None).unwrap());
}
