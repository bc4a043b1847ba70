#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;

fn call(b: Builtin, args: Vec<Value>) -> String {
    call_builtin(b, args, Vec::new()).unwrap().repr()
}

fn ints(items: &[i64]) -> Value {
    Value::list(items.iter().copied().map(Value::Int).collect())
}

#[test]
fn lookup_covers_functions_types_and_exceptions() {
    assert!(matches!(lookup_builtin("len"), Some(Value::Builtin(Builtin::Len))));
    assert!(matches!(lookup_builtin("int"), Some(Value::Type(ValueType::Int))));
    assert!(matches!(lookup_builtin("KeyError"), Some(Value::ExceptionType(_))));
    assert!(matches!(lookup_builtin(COPY_BUILTIN), Some(Value::Builtin(Builtin::Copy))));
    assert!(lookup_builtin("nope").is_none());
    assert!(!builtin_names().contains(&COPY_BUILTIN));
}

#[test]
fn len_and_range() {
    assert_eq!(call(Builtin::Len, vec![Value::from("héllo")]), "5");
    assert_eq!(call(Builtin::Range, vec![Value::Int(3)]), "[0, 1, 2]");
    assert_eq!(
        call(Builtin::Range, vec![Value::Int(5), Value::Int(0), Value::Int(-2)]),
        "[5, 3, 1]"
    );
    let err = call_builtin(Builtin::Len, vec![Value::Int(1)], Vec::new()).unwrap_err();
    assert_eq!(err.message, "object of type 'int' has no len()");
}

#[test]
fn aggregates() {
    assert_eq!(call(Builtin::Sum, vec![ints(&[1, 2, 3])]), "6");
    assert_eq!(call(Builtin::Min, vec![ints(&[3, 1, 2])]), "1");
    assert_eq!(call(Builtin::Max, vec![Value::Int(3), Value::Int(7)]), "7");
    assert_eq!(call(Builtin::Any, vec![ints(&[0, 0, 1])]), "True");
    assert_eq!(call(Builtin::All, vec![ints(&[])]), "True");
    let err = call_builtin(Builtin::Max, vec![ints(&[])], Vec::new()).unwrap_err();
    assert_eq!(err.message, "max() arg is an empty sequence");
}

#[test]
fn sorted_with_reverse() {
    let result = call_builtin(
        Builtin::Sorted,
        vec![ints(&[2, 3, 1])],
        vec![("reverse".into(), Value::Bool(true))],
    )
    .unwrap();
    assert_eq!(result.repr(), "[3, 2, 1]");
    let err = call_builtin(
        Builtin::Sorted,
        vec![Value::list(vec![Value::Int(1), Value::from("a")])],
        Vec::new(),
    )
    .unwrap_err();
    assert_eq!(err.type_name(), "TypeError");
}

#[test]
fn enumerate_and_zip() {
    assert_eq!(
        call(Builtin::Enumerate, vec![Value::from("ab")]),
        "[(0, 'a'), (1, 'b')]"
    );
    assert_eq!(
        call(Builtin::Zip, vec![ints(&[1, 2, 3]), Value::from("xy")]),
        "[(1, 'x'), (2, 'y')]"
    );
}

#[test]
fn type_and_isinstance() {
    assert_eq!(call(Builtin::Type, vec![Value::Int(1)]), "<type 'int'>");
    assert_eq!(
        call(Builtin::Isinstance, vec![Value::Bool(true), Value::Type(ValueType::Int)]),
        "True"
    );
    assert_eq!(
        call(
            Builtin::Isinstance,
            vec![
                Value::from("s"),
                Value::tuple(vec![Value::Type(ValueType::Int), Value::Type(ValueType::Str)])
            ]
        ),
        "True"
    );
}

#[test]
fn namespace_from_keywords() {
    let ns = call_builtin(
        Builtin::Namespace,
        Vec::new(),
        vec![("b".into(), Value::Int(2)), ("a".into(), Value::Int(1))],
    )
    .unwrap();
    assert_eq!(ns.repr(), "namespace(a=1, b=2)");
}

#[test]
fn copy_is_shallow() {
    let inner = ints(&[1]);
    let outer = Value::list(vec![inner.clone()]);
    let copy = call_builtin(Builtin::Copy, vec![outer.clone()], Vec::new()).unwrap();
    assert!(!copy.is_same(&outer));
    assert!(copy.snapshot_items().unwrap()[0].is_same(&inner));
}

#[test]
fn type_constructors() {
    let t = |ty: ValueType, args: Vec<Value>| call_type(ty, args, Vec::new()).unwrap().repr();
    assert_eq!(t(ValueType::Int, vec![Value::from(" 42 ")]), "42");
    assert_eq!(t(ValueType::Int, vec![Value::from("ff"), Value::Int(16)]), "255");
    assert_eq!(t(ValueType::Int, vec![Value::Float(-2.7)]), "-2");
    assert_eq!(t(ValueType::Float, vec![Value::from("1.5")]), "1.5");
    assert_eq!(t(ValueType::Str, vec![Value::Float(0.5)]), "'0.5'");
    assert_eq!(t(ValueType::Tuple, vec![ints(&[1])]), "(1,)");
    assert_eq!(t(ValueType::List, vec![]), "[]");
    assert_eq!(
        call_type(
            ValueType::Dict,
            vec![Value::list(vec![Value::tuple(vec![Value::from("k"), Value::Int(1)])])],
            vec![("z".into(), Value::Int(2))]
        )
        .unwrap()
        .repr(),
        "{'k': 1, 'z': 2}"
    );
    let err = call_type(ValueType::Int, vec![Value::from("x")], Vec::new()).unwrap_err();
    assert_eq!(err.to_string(), "ValueError: invalid literal for int() with base 10: 'x'");
}

#[test]
fn html_is_custom() {
    let v = call_builtin(Builtin::Html, vec![Value::from("<b>")], Vec::new()).unwrap();
    assert!(matches!(v, Value::Custom(_)));
    assert_eq!(v.type_name(), "html");
}
