#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use reckon_ir::{BinaryOp, CmpOp, Expr, ExprKind, PrintTarget, StmtKind};

use crate::{parse, CompileError, SyntaxError};

fn stmt(text: &str) -> StmtKind {
    let mut module = parse(text).unwrap();
    assert_eq!(module.body.len(), 1, "expected one statement in {text:?}");
    module.body.remove(0).kind
}

fn expr_of(text: &str) -> ExprKind {
    match stmt(text) {
        StmtKind::Expr(e) => e.kind,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

fn e(kind: ExprKind) -> Expr {
    Expr::synthetic(kind)
}

fn name(n: &str) -> Expr {
    e(ExprKind::Name(n.into()))
}

fn int(v: i64) -> Expr {
    e(ExprKind::Int(v))
}

fn syntax_error(text: &str) -> SyntaxError {
    match parse(text).unwrap_err() {
        CompileError::Syntax(err) => err,
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn precedence() {
    assert_eq!(
        expr_of("1 + 2 * 3"),
        ExprKind::Binary {
            op: BinaryOp::Add,
            left: Box::new(int(1)),
            right: Box::new(e(ExprKind::Binary {
                op: BinaryOp::Mul,
                left: Box::new(int(2)),
                right: Box::new(int(3)),
            })),
        }
    );
}

#[test]
fn power_binds_tighter_than_unary_minus() {
    let ExprKind::Unary { operand, .. } = expr_of("-2 ** 2") else {
        panic!("expected unary");
    };
    assert!(matches!(operand.kind, ExprKind::Binary { op: BinaryOp::Pow, .. }));
    assert_eq!(expr_of("-5"), ExprKind::Int(-5));
}

#[test]
fn chained_comparison() {
    assert_eq!(
        expr_of("a < b not in c"),
        ExprKind::Compare {
            left: Box::new(name("a")),
            ops: vec![(CmpOp::Lt, name("b")), (CmpOp::NotIn, name("c"))],
        }
    );
    assert!(matches!(
        expr_of("a is not None"),
        ExprKind::Compare { ref ops, .. } if ops[0].0 == CmpOp::IsNot
    ));
}

#[test]
fn literals() {
    assert_eq!(expr_of("None"), ExprKind::NoneLit);
    assert_eq!(expr_of("True"), ExprKind::Bool(true));
    assert_eq!(expr_of("'a' \"b\""), ExprKind::Str("ab".into()));
    assert_eq!(expr_of("()"), ExprKind::Tuple(vec![]));
    assert_eq!(expr_of("(1)"), ExprKind::Int(1));
    assert_eq!(expr_of("(1,)"), ExprKind::Tuple(vec![int(1)]));
    assert_eq!(
        expr_of("{1: 2,}"),
        ExprKind::Dict(vec![(int(1), int(2))])
    );
}

#[test]
fn trailers() {
    assert_eq!(
        expr_of("f(1, x=2).y[0]"),
        ExprKind::Subscript {
            value: Box::new(e(ExprKind::Attribute {
                value: Box::new(e(ExprKind::Call {
                    func: Box::new(name("f")),
                    args: vec![int(1)],
                    keywords: vec![reckon_ir::Keyword {
                        name: "x".into(),
                        value: int(2),
                    }],
                })),
                attr: "y".into(),
            })),
            index: Box::new(int(0)),
        }
    );
}

#[test]
fn slices() {
    let ExprKind::Subscript { index, .. } = expr_of("a[1:]") else {
        panic!("expected subscript");
    };
    assert_eq!(
        index.kind,
        ExprKind::Slice {
            lower: Some(Box::new(int(1))),
            upper: None,
            step: None,
        }
    );
    let ExprKind::Subscript { index, .. } = expr_of("a[::2]") else {
        panic!("expected subscript");
    };
    assert_eq!(
        index.kind,
        ExprKind::Slice {
            lower: None,
            upper: None,
            step: Some(Box::new(int(2))),
        }
    );
}

#[test]
fn list_comprehension() {
    let ExprKind::ListComp { generators, .. } = expr_of("[x * 2 for x in y if x if x > 1]") else {
        panic!("expected list comprehension");
    };
    assert_eq!(generators.len(), 1);
    assert_eq!(generators[0].ifs.len(), 2);
}

#[test]
fn lambda_and_conditional() {
    let ExprKind::Lambda(def) = expr_of("lambda x, y=1: x if y else 0") else {
        panic!("expected lambda");
    };
    assert_eq!(def.params.len(), 2);
    assert!(matches!(
        def.body[0].kind,
        StmtKind::Return(Some(Expr {
            kind: ExprKind::IfExp { .. },
            ..
        }))
    ));
}

#[test]
fn assignments() {
    assert_eq!(
        stmt("a = b = 1"),
        StmtKind::Assign {
            targets: vec![name("a"), name("b")],
            value: int(1),
        }
    );
    assert_eq!(
        stmt("a, b = 1, 2"),
        StmtKind::Assign {
            targets: vec![e(ExprKind::Tuple(vec![name("a"), name("b")]))],
            value: e(ExprKind::Tuple(vec![int(1), int(2)])),
        }
    );
    assert_eq!(
        stmt("x //= 2"),
        StmtKind::AugAssign {
            target: name("x"),
            op: BinaryOp::FloorDiv,
            value: int(2),
        }
    );
}

#[test]
fn print_forms() {
    assert_eq!(
        stmt("print"),
        StmtKind::Print {
            target: PrintTarget::Stdout,
            values: vec![],
            newline: true,
        }
    );
    assert_eq!(
        stmt("print 'a', 'b',"),
        StmtKind::Print {
            target: PrintTarget::Stdout,
            values: vec![e(ExprKind::Str("a".into())), e(ExprKind::Str("b".into()))],
            newline: false,
        }
    );
    assert_eq!(
        stmt("print >>out, 1"),
        StmtKind::Print {
            target: PrintTarget::Stream(name("out")),
            values: vec![int(1)],
            newline: true,
        }
    );
}

#[test]
fn compound_statements() {
    let StmtKind::If { orelse, .. } = stmt("if a:\n    1\nelif b:\n    2\nelse:\n    3") else {
        panic!("expected if");
    };
    let StmtKind::If { orelse: inner, .. } = &orelse[0].kind else {
        panic!("elif should nest");
    };
    assert_eq!(inner.len(), 1);

    let StmtKind::Try {
        handlers,
        orelse,
        finalbody,
        ..
    } = stmt("try:\n    x\nexcept KeyError as e:\n    pass\nexcept:\n    pass\nelse:\n    y\nfinally:\n    z")
    else {
        panic!("expected try");
    };
    assert_eq!(handlers.len(), 2);
    assert_eq!(handlers[0].name.as_deref(), Some("e"));
    assert!(handlers[1].kind.is_none());
    assert_eq!(orelse.len(), 1);
    assert_eq!(finalbody.len(), 1);

    assert!(matches!(
        stmt("while x: x -= 1"),
        StmtKind::While { .. }
    ));
    assert!(matches!(
        stmt("for k, v in d:\n  pass\nelse:\n  pass"),
        StmtKind::For { .. }
    ));
}

#[test]
fn def_with_defaults() {
    let StmtKind::FunctionDef(def) = stmt("def f(a, b=2):\n    return a + b") else {
        panic!("expected def");
    };
    assert_eq!(def.name, "f");
    assert_eq!(def.params[1].default, Some(int(2)));
}

#[test]
fn syntax_errors() {
    assert_eq!(syntax_error("b = "), SyntaxError::new("invalid syntax", 0, 4));
    assert_eq!(
        syntax_error("def f(a=1, b): pass").message,
        "non-default argument follows default argument"
    );
    assert_eq!(syntax_error("1 = a").message, "can't assign to literal");
    assert_eq!(syntax_error("f() = a").message, "can't assign to function call");
    assert_eq!(
        syntax_error("if x:\nprint 1").message,
        "expected an indented block"
    );
    assert_eq!(syntax_error("  x").message, "unexpected indent");
    assert_eq!(syntax_error("x y").offset, 2);
    assert_eq!(syntax_error("if x:\n    1\n2 +").line, 2);
}

#[test]
fn control_flow_outside_its_context() {
    assert_eq!(syntax_error("break").message, "'break' outside loop");
    assert_eq!(
        syntax_error("if x:\n    continue").message,
        "'continue' not properly in loop"
    );
    assert_eq!(syntax_error("return 1").message, "'return' outside function");
    assert_eq!(
        syntax_error("while x:\n    def f():\n        break").message,
        "'break' outside loop"
    );
    assert!(parse("while x:\n    break\nelse:\n    pass").is_ok());
    assert!(parse("def f():\n    for i in x:\n        return i").is_ok());
}

#[test]
fn unsupported_constructs() {
    for text in ["import os", "class A: pass", "with f: pass", "from a import b", "f(*args)"] {
        assert!(
            matches!(parse(text), Err(CompileError::Unsupported(_))),
            "{text:?} should be unsupported"
        );
    }
}
