//! Statement syntax tree.
//!
//! A worksheet statement parses to a [`Module`]: a suite of [`Stmt`]s, each
//! possibly containing nested suites. Nodes are boxed trees rather than
//! arena indices; statements are small and the rewrite engine rebuilds
//! parts of the tree.
//!
//! Two node kinds only ever come out of the rewrite engine:
//! [`StmtKind::Output`] (an auto-displayed bare expression) and
//! [`PrintTarget::Hook`] (a captured `print`).

use std::fmt;
use std::sync::Arc;

use crate::Span;

/// A sequence of statements at one indentation level.
pub type Suite = Vec<Stmt>;

/// Parsed text of one worksheet statement.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Module {
    pub body: Suite,
}

#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

impl PartialEq for Stmt {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// Expression evaluated for its side effects.
    Expr(Expr),
    /// Values handed to the output hook (rewritten bare expression).
    Output(Vec<Expr>),
    /// `a = b = value`; `targets` in source order.
    Assign { targets: Vec<Expr>, value: Expr },
    AugAssign {
        target: Expr,
        op: BinaryOp,
        value: Expr,
    },
    /// `print a, b` / `print >>stream, a`. `newline` is false with a
    /// trailing comma.
    Print {
        target: PrintTarget,
        values: Vec<Expr>,
        newline: bool,
    },
    Del(Vec<Expr>),
    Pass,
    Break,
    Continue,
    Return(Option<Expr>),
    Assert { test: Expr, msg: Option<Expr> },
    Raise(Option<Expr>),
    If {
        test: Expr,
        body: Suite,
        orelse: Suite,
    },
    While {
        test: Expr,
        body: Suite,
        orelse: Suite,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Suite,
        orelse: Suite,
    },
    FunctionDef(Arc<FunctionDef>),
    Try {
        body: Suite,
        handlers: Vec<ExceptHandler>,
        orelse: Suite,
        finalbody: Suite,
    },
    Global(Vec<String>),
    Nonlocal(Vec<String>),
}

/// Where a `print` statement writes.
#[derive(Clone, Debug, PartialEq)]
pub enum PrintTarget {
    /// Process standard output.
    Stdout,
    /// The statement's print hook.
    Hook,
    /// `print >>stream, ...`: an object with a `write` method.
    Stream(Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Suite,
    pub span: Span,
}

impl FunctionDef {
    /// The literal docstring, if the body starts with one.
    pub fn docstring(&self) -> Option<&str> {
        match self.body.first().map(|s| &s.kind) {
            Some(StmtKind::Expr(Expr {
                kind: ExprKind::Str(s),
                ..
            })) => Some(s),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExceptHandler {
    /// Exception type filter; `None` catches everything.
    pub kind: Option<Expr>,
    pub name: Option<String>,
    pub body: Suite,
}

#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    /// Expression synthesized by a rewrite.
    pub fn synthetic(kind: ExprKind) -> Self {
        Expr {
            kind,
            span: Span::DUMMY,
        }
    }

    pub fn is_string_literal(&self) -> bool {
        matches!(self.kind, ExprKind::Str(_))
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Name(String),
    Int(i64),
    Float(f64),
    Str(String),
    NoneLit,
    Bool(bool),
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    /// Only valid as a subscript index.
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    BoolOp {
        op: BoolOp,
        values: Vec<Expr>,
    },
    /// Chained comparison `a < b <= c`.
    Compare {
        left: Box<Expr>,
        ops: Vec<(CmpOp, Expr)>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    /// `lambda x: e`, stored as a function whose body returns `e`.
    Lambda(Arc<FunctionDef>),
    /// Backquote repr: `` `x` ``.
    Repr(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Keyword {
    pub name: String,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitAnd,
    BitOr,
    BitXor,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Pos,
    Invert,
    Not,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    In,
    NotIn,
    Is,
    IsNot,
}
