//! Reckon IR - shared vocabulary of the worksheet engine.
//!
//! - [`Span`] and [`LineMap`] for locations inside one statement's text
//! - The statement syntax tree ([`ast`]) produced by `reckon_parse` and
//!   walked by `reckon_eval`
//! - [`MutationPath`], the access paths the rewrite engine flags as
//!   possibly modified in place
//!
//! Everything here is plain data. Spans never take part in equality, so two
//! trees parsed from differently spaced text compare equal.

pub mod ast;
mod mutation;
mod span;

pub use ast::{
    BinaryOp, BoolOp, CmpOp, Comprehension, ExceptHandler, Expr, ExprKind, FunctionDef, Keyword,
    Module, Param, PrintTarget, Stmt, StmtKind, Suite, UnaryOp,
};
pub use mutation::{Mutation, MutationPath, PathSegment, COPY_BUILTIN};
pub use span::{LineMap, Span};
