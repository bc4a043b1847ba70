#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;

fn ints(items: &[i64]) -> Vec<Value> {
    items.iter().copied().map(Value::Int).collect()
}

#[test]
fn scalar_repr() {
    assert_eq!(Value::None.repr(), "None");
    assert_eq!(Value::Bool(true).repr(), "True");
    assert_eq!(Value::Int(-3).repr(), "-3");
    assert_eq!(Value::string("a").repr(), "'a'");
    assert_eq!(Value::string("it's").repr(), "\"it's\"");
    assert_eq!(Value::string("a\nb\\").repr(), "'a\\nb\\\\'");
}

#[test]
fn float_repr_and_str() {
    assert_eq!(format_float_repr(1.0), "1.0");
    assert_eq!(format_float_repr(0.1), "0.1");
    assert_eq!(format_float_repr(0.1 + 0.2), "0.30000000000000004");
    assert_eq!(format_float_repr(1e20), "1e+20");
    assert_eq!(format_float_repr(1.5e-5), "1.5e-05");
    assert_eq!(format_float_repr(f64::INFINITY), "inf");
    assert_eq!(format_float_str(0.1 + 0.2), "0.3");
    assert_eq!(format_float_str(123.0), "123.0");
    assert_eq!(format_float_str(1e20), "1e+20");
    assert_eq!(format_float_str(2.5), "2.5");
}

#[test]
fn container_repr() {
    assert_eq!(Value::tuple(ints(&[1, 2])).repr(), "(1, 2)");
    assert_eq!(Value::tuple(ints(&[1])).repr(), "(1,)");
    assert_eq!(Value::tuple(vec![]).repr(), "()");
    assert_eq!(Value::list(ints(&[1, 2])).repr(), "[1, 2]");

    let mut dict = Dict::new();
    dict.insert(Value::string("b"), Value::Int(1)).unwrap();
    dict.insert(Value::string("a"), Value::Int(2)).unwrap();
    assert_eq!(Value::dict(dict).repr(), "{'b': 1, 'a': 2}");

    let mut ns = Namespace::new();
    ns.insert("y".into(), Value::Int(2));
    ns.insert("x".into(), Value::string("s"));
    assert_eq!(Value::namespace(ns).repr(), "namespace(x='s', y=2)");
}

#[test]
fn cyclic_list_repr() {
    let list = Value::list(ints(&[1]));
    if let Value::List(items) = &list {
        items.lock().push(list.clone());
    }
    assert_eq!(list.repr(), "[1, [...]]");
    // Break the cycle so the test does not leak.
    if let Value::List(items) = &list {
        items.lock().clear();
    }
}

#[test]
fn str_of_values() {
    assert_eq!(Value::string("a").to_str(), "a");
    assert_eq!(Value::list(vec![Value::string("a")]).to_str(), "['a']");
    assert_eq!(Value::exception("ValueError", "bad").to_str(), "bad");
    assert_eq!(Value::exception("ValueError", "bad").repr(), "ValueError('bad',)");
}

#[test]
fn truthiness() {
    assert!(!Value::None.is_truthy());
    assert!(!Value::Int(0).is_truthy());
    assert!(!Value::string("").is_truthy());
    assert!(!Value::list(vec![]).is_truthy());
    assert!(Value::list(ints(&[0])).is_truthy());
    assert!(Value::Float(0.5).is_truthy());
}

#[test]
fn equality_crosses_numeric_types() {
    assert!(Value::Int(1).equals(&Value::Float(1.0)));
    assert!(Value::Bool(true).equals(&Value::Int(1)));
    assert!(!Value::Int(1).equals(&Value::string("1")));
    assert!(Value::list(ints(&[1, 2])).equals(&Value::list(ints(&[1, 2]))));
    assert!(!Value::list(ints(&[1, 2])).equals(&Value::tuple(ints(&[1, 2]))));
}

#[test]
fn self_equality_does_not_deadlock() {
    let list = Value::list(ints(&[1]));
    assert!(list.equals(&list.clone()));
}

#[test]
fn dict_keys_unify_numbers() {
    let mut dict = Dict::new();
    dict.insert(Value::Int(1), Value::string("a")).unwrap();
    dict.insert(Value::Bool(true), Value::string("b")).unwrap();
    dict.insert(Value::Float(1.0), Value::string("c")).unwrap();
    assert_eq!(dict.len(), 1);
    assert_eq!(dict.get(&Value::Int(1)).unwrap().unwrap().repr(), "'c'");
    // The first key object is kept.
    assert_eq!(dict.keys()[0].repr(), "1");
}

#[test]
fn dict_remove_keeps_order() {
    let mut dict = Dict::from_pairs(
        ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, k)| (Value::from(*k), Value::Int(i as i64))),
    )
    .unwrap();
    assert_eq!(dict.remove(&Value::from("a")).unwrap().unwrap().repr(), "0");
    assert_eq!(dict.get(&Value::from("c")).unwrap().unwrap().repr(), "2");
    assert_eq!(Value::list(dict.keys()).repr(), "['b', 'c']");
}

#[test]
fn unhashable_keys() {
    let mut dict = Dict::new();
    let err = dict.insert(Value::list(vec![]), Value::None).unwrap_err();
    assert_eq!(err.message, "unhashable type: 'list'");
}

#[test]
fn shallow_copy_duplicates_containers_only() {
    let inner = Value::list(ints(&[1]));
    let outer = Value::list(vec![inner.clone()]);
    let copy = outer.shallow_copy().unwrap();
    assert!(!copy.is_same(&outer));
    assert!(copy.equals(&outer));
    let first = copy.snapshot_items().unwrap().remove(0);
    assert!(first.is_same(&inner));

    let s = Value::string("x");
    assert!(s.shallow_copy().unwrap().is_same(&s));

    let html = Value::custom(HtmlResult { html: "<b/>".into() });
    assert!(html.shallow_copy().is_err());
}
