#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;

fn name(n: &str) -> Expr {
    Expr::synthetic(ExprKind::Name(n.into()))
}

fn attr(value: Expr, a: &str) -> Expr {
    Expr::synthetic(ExprKind::Attribute {
        value: Box::new(value),
        attr: a.into(),
    })
}

fn index(value: Expr, i: i64) -> Expr {
    Expr::synthetic(ExprKind::Subscript {
        value: Box::new(value),
        index: Box::new(Expr::synthetic(ExprKind::Int(i))),
    })
}

fn call(func: Expr) -> Expr {
    Expr::synthetic(ExprKind::Call {
        func: Box::new(func),
        args: vec![],
        keywords: vec![],
    })
}

fn descriptions(paths: &[MutationPath]) -> Vec<String> {
    paths.iter().map(MutationPath::describe).collect()
}

#[test]
fn path_requires_name_root() {
    assert!(MutationPath::from_expr(&attr(name("a"), "b")).is_some());
    let literal_root = attr(Expr::synthetic(ExprKind::Int(1)), "real");
    assert!(MutationPath::from_expr(&literal_root).is_none());
}

#[test]
fn describe_elides_indexes_and_arguments() {
    let expr = attr(call(attr(index(name("a"), 0), "get")), "x");
    let path = MutationPath::from_expr(&expr).unwrap();
    assert_eq!(path.describe(), "a[...].get(...).x");
    assert_eq!(path.root(), "a");
}

#[test]
fn method_call_is_chopped_as_one_piece() {
    let expr = call(attr(name("a"), "get_a"));
    let path = MutationPath::from_expr(&expr).unwrap();
    let parent = path.parent().unwrap();
    assert_eq!(parent.describe(), "a");
}

#[test]
fn reduce_adds_prefixes_shortest_first() {
    let deep = MutationPath::from_expr(&attr(attr(name("a"), "b"), "c"))
        .unwrap();
    let mid = MutationPath::from_expr(&attr(name("a"), "b")).unwrap();
    let reduced = MutationPath::reduce(&[deep, mid]);
    assert_eq!(descriptions(&reduced), vec!["a", "a.b", "a.b.c"]);
}

#[test]
fn reduce_skips_call_results() {
    let expr = attr(call(attr(name("a"), "get_a")), "a");
    let path = MutationPath::from_expr(&expr).unwrap();
    let reduced = MutationPath::reduce(&[path]);
    assert_eq!(descriptions(&reduced), vec!["a", "a.get_a(...).a"]);
}

#[test]
fn distinct_indexes_are_distinct_paths() {
    let a0 = MutationPath::from_expr(&index(name("a"), 0)).unwrap();
    let a1 = MutationPath::from_expr(&index(name("a"), 1)).unwrap();
    let reduced = MutationPath::reduce(&[a0.clone(), a1, a0]);
    assert_eq!(descriptions(&reduced), vec!["a", "a[...]", "a[...]"]);
}

#[test]
fn copy_code_assigns_copy_of_path() {
    let path = MutationPath::from_expr(&attr(name("a"), "b")).unwrap();
    let m = Mutation::new(path);
    assert_eq!(m.root, "a");
    assert_eq!(m.description, "a.b");
    match &m.copy_code.kind {
        StmtKind::Assign { targets, value } => {
            assert_eq!(targets.len(), 1);
            assert!(matches!(&value.kind, ExprKind::Call { args, .. } if args[0] == targets[0]));
        }
        other => panic!("unexpected copy code {other:?}"),
    }
}
