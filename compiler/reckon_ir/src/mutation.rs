//! Mutation paths.
//!
//! A mutation path is an access chain rooted at a variable name, such as
//! `a`, `a.b`, `a[i]` or `a.get(k).items`, that a statement may modify in
//! place. Before such a statement runs, each prefix of the path that can be
//! assigned to is shallow-copied in the statement's own scope so the
//! mutation cannot reach the scope recorded by an earlier statement.

use std::fmt::Write as _;

use crate::ast::{Expr, ExprKind, Keyword, Stmt, StmtKind};
use crate::Span;

/// Name of the builtin the copy-preparation code calls.
pub const COPY_BUILTIN: &str = "__copy";

/// One step of a [`MutationPath`].
#[derive(Clone, Debug, PartialEq)]
pub enum PathSegment {
    /// Root variable; always and only the first segment.
    Name(String),
    /// `.attr`
    Attr(String),
    /// `[index]`
    Index(Expr),
    /// `(args)`
    Call { args: Vec<Expr>, keywords: Vec<Keyword> },
}

/// Access path whose first segment is a [`PathSegment::Name`].
#[derive(Clone, Debug, PartialEq)]
pub struct MutationPath {
    segments: Vec<PathSegment>,
}

impl MutationPath {
    /// Path for an expression built only of names, attributes, subscripts
    /// and calls. `None` when the chain is not rooted at a plain name.
    pub fn from_expr(expr: &Expr) -> Option<Self> {
        let mut rev = Vec::new();
        let mut cur = expr;
        loop {
            match &cur.kind {
                ExprKind::Name(name) => {
                    rev.push(PathSegment::Name(name.clone()));
                    break;
                }
                ExprKind::Attribute { value, attr } => {
                    rev.push(PathSegment::Attr(attr.clone()));
                    cur = value;
                }
                ExprKind::Subscript { value, index } => {
                    rev.push(PathSegment::Index((**index).clone()));
                    cur = value;
                }
                ExprKind::Call {
                    func,
                    args,
                    keywords,
                } => {
                    rev.push(PathSegment::Call {
                        args: args.clone(),
                        keywords: keywords.clone(),
                    });
                    cur = func;
                }
                _ => return None,
            }
        }
        rev.reverse();
        Some(MutationPath { segments: rev })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The root variable name.
    pub fn root(&self) -> &str {
        match self.segments.first() {
            Some(PathSegment::Name(name)) => name,
            _ => "",
        }
    }

    pub fn ends_in_call(&self) -> bool {
        matches!(self.segments.last(), Some(PathSegment::Call { .. }))
    }

    /// The path with its last piece removed. A method call `.name(...)`
    /// is removed as one piece.
    #[must_use]
    pub fn parent(&self) -> Option<MutationPath> {
        let n = self.segments.len();
        if n <= 1 {
            return None;
        }
        let cut = if self.ends_in_call()
            && n > 2
            && matches!(self.segments[n - 2], PathSegment::Attr(_))
        {
            2
        } else {
            1
        };
        Some(MutationPath {
            segments: self.segments[..n - cut].to_vec(),
        })
    }

    /// Skeletal human description: `a.b[...](...)`.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                PathSegment::Name(name) => out.push_str(name),
                PathSegment::Attr(attr) => {
                    let _ = write!(out, ".{attr}");
                }
                PathSegment::Index(_) => out.push_str("[...]"),
                PathSegment::Call { .. } => out.push_str("(...)"),
            }
        }
        out
    }

    /// Rebuild the access expression.
    pub fn to_expr(&self) -> Expr {
        let mut iter = self.segments.iter();
        let mut expr = match iter.next() {
            Some(PathSegment::Name(name)) => Expr::synthetic(ExprKind::Name(name.clone())),
            _ => Expr::synthetic(ExprKind::NoneLit),
        };
        for seg in iter {
            let kind = match seg {
                PathSegment::Name(name) => ExprKind::Name(name.clone()),
                PathSegment::Attr(attr) => ExprKind::Attribute {
                    value: Box::new(expr),
                    attr: attr.clone(),
                },
                PathSegment::Index(index) => ExprKind::Subscript {
                    value: Box::new(expr),
                    index: Box::new(index.clone()),
                },
                PathSegment::Call { args, keywords } => ExprKind::Call {
                    func: Box::new(expr),
                    args: args.clone(),
                    keywords: keywords.clone(),
                },
            };
            expr = Expr::synthetic(kind);
        }
        expr
    }

    /// Minimal set of paths to shallow-copy for `paths`, shortest first.
    ///
    /// Every prefix of every path is included, except prefixes ending in a
    /// call (a call result cannot be assigned back). Duplicates collapse.
    pub fn reduce(paths: &[MutationPath]) -> Vec<MutationPath> {
        let mut out: Vec<MutationPath> = Vec::new();
        for path in paths {
            let mut cur = Some(path.clone());
            while let Some(p) = cur {
                if !p.ends_in_call() && !out.contains(&p) {
                    out.push(p.clone());
                }
                cur = p.parent();
            }
        }
        out.sort_by_key(MutationPath::len);
        out
    }
}

/// A path that must be shallow-copied before a statement executes.
#[derive(Clone, Debug, PartialEq)]
pub struct Mutation {
    /// Root variable; the copy is skipped when it is unbound.
    pub root: String,
    /// Shown in the "apparently modified" warning.
    pub description: String,
    pub path: MutationPath,
    /// `path = __copy(path)`
    pub copy_code: Stmt,
}

impl Mutation {
    pub fn new(path: MutationPath) -> Self {
        let target = path.to_expr();
        let value = Expr::synthetic(ExprKind::Call {
            func: Box::new(Expr::synthetic(ExprKind::Name(COPY_BUILTIN.to_owned()))),
            args: vec![target.clone()],
            keywords: Vec::new(),
        });
        Mutation {
            root: path.root().to_owned(),
            description: path.describe(),
            copy_code: Stmt::new(
                StmtKind::Assign {
                    targets: vec![target],
                    value,
                },
                Span::DUMMY,
            ),
            path,
        }
    }
}

#[cfg(test)]
mod tests;
