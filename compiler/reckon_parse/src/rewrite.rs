//! Rewrite engine.
//!
//! Three transformations are applied to a parsed statement:
//!
//! 1. A bare expression statement becomes [`StmtKind::Output`], so its
//!    value is shown as a result. The leading docstring of a function body
//!    is left alone.
//! 2. A `print` without an explicit stream is routed to the print hook
//!    ([`PrintTarget::Hook`]).
//! 3. Every access path the statement may modify in place is recorded as
//!    a [`Mutation`], so the executor can shallow-copy it beforehand:
//!    - the container of a subscript or attribute assignment (`a[0] = 1`
//!      marks `a`) and of a `del` target
//!    - the full target of an augmented assignment (`a.b += 1` marks
//!      `a.b`)
//!    - the receiver of a method call statement (`a.b.append(1)` marks
//!      `a.b`), unless the [`MutatorHeuristic`] says the method is a
//!      getter
//!
//! `global` and `nonlocal` are rejected: a statement cannot rebind names
//! in a scope it does not own.

use std::fmt;
use std::sync::Arc;

use reckon_ir::{
    Expr, ExprKind, LineMap, Module, Mutation, MutationPath, PrintTarget, Stmt, StmtKind, Suite,
};

use crate::UnsupportedConstructError;

/// Decides whether a method call may modify its receiver.
pub trait MutatorHeuristic: Send + Sync + fmt::Debug {
    fn is_mutator(&self, method: &str) -> bool;
}

/// Treats every method as a mutator except those whose name starts with
/// one of the getter prefixes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetterPrefixes {
    prefixes: Vec<String>,
}

impl GetterPrefixes {
    pub const DEFAULT: [&'static str; 3] = ["get", "is", "has"];

    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GetterPrefixes {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Default for GetterPrefixes {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl MutatorHeuristic for GetterPrefixes {
    fn is_mutator(&self, method: &str) -> bool {
        !self.prefixes.iter().any(|p| method.starts_with(p.as_str()))
    }
}

/// Which rewrites to apply.
#[derive(Clone, Debug)]
pub struct RewriteOptions {
    /// Turn bare expressions into output-hook calls.
    pub output: bool,
    /// Route `print` to the print hook.
    pub print: bool,
    pub heuristic: Arc<dyn MutatorHeuristic>,
}

impl RewriteOptions {
    #[must_use]
    pub fn with_heuristic(mut self, heuristic: Arc<dyn MutatorHeuristic>) -> Self {
        self.heuristic = heuristic;
        self
    }
}

impl Default for RewriteOptions {
    fn default() -> Self {
        RewriteOptions {
            output: true,
            print: true,
            heuristic: Arc::new(GetterPrefixes::default()),
        }
    }
}

/// Rewrite a parsed statement. Returns the new tree and the mutations to
/// prepare, shortest path first.
pub fn rewrite(
    module: Module,
    lines: &LineMap,
    options: &RewriteOptions,
) -> Result<(Module, Vec<Mutation>), UnsupportedConstructError> {
    let mut rewriter = Rewriter {
        options,
        lines,
        mutated: Vec::new(),
    };
    let body = rewriter.suite(module.body, false)?;
    let mutations = MutationPath::reduce(&rewriter.mutated)
        .into_iter()
        .map(Mutation::new)
        .collect();
    Ok((Module { body }, mutations))
}

struct Rewriter<'a> {
    options: &'a RewriteOptions,
    lines: &'a LineMap,
    mutated: Vec<MutationPath>,
}

type RewriteResult<T> = Result<T, UnsupportedConstructError>;

impl Rewriter<'_> {
    fn suite(&mut self, body: Suite, function_body: bool) -> RewriteResult<Suite> {
        let mut out = Vec::with_capacity(body.len());
        for (i, stmt) in body.into_iter().enumerate() {
            let docstring = function_body
                && i == 0
                && matches!(&stmt.kind, StmtKind::Expr(e) if e.is_string_literal());
            out.push(self.stmt(stmt, docstring)?);
        }
        Ok(out)
    }

    fn stmt(&mut self, stmt: Stmt, docstring: bool) -> RewriteResult<Stmt> {
        let Stmt { kind, span } = stmt;
        let kind = match kind {
            StmtKind::Expr(expr) => {
                self.note_method_calls(&expr);
                if docstring || !self.options.output {
                    StmtKind::Expr(expr)
                } else {
                    match expr.kind {
                        ExprKind::Tuple(items) if !items.is_empty() => StmtKind::Output(items),
                        kind => StmtKind::Output(vec![Expr::new(kind, expr.span)]),
                    }
                }
            }
            StmtKind::Print {
                target: PrintTarget::Stdout,
                values,
                newline,
            } if self.options.print => StmtKind::Print {
                target: PrintTarget::Hook,
                values,
                newline,
            },
            StmtKind::Assign { targets, value } => {
                for target in &targets {
                    self.note_container(target);
                }
                StmtKind::Assign { targets, value }
            }
            StmtKind::AugAssign { target, op, value } => {
                self.note_path(&target);
                StmtKind::AugAssign { target, op, value }
            }
            StmtKind::Del(targets) => {
                for target in &targets {
                    self.note_container(target);
                }
                StmtKind::Del(targets)
            }
            StmtKind::If { test, body, orelse } => StmtKind::If {
                test,
                body: self.suite(body, false)?,
                orelse: self.suite(orelse, false)?,
            },
            StmtKind::While { test, body, orelse } => StmtKind::While {
                test,
                body: self.suite(body, false)?,
                orelse: self.suite(orelse, false)?,
            },
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            } => {
                self.note_container(&target);
                StmtKind::For {
                    target,
                    iter,
                    body: self.suite(body, false)?,
                    orelse: self.suite(orelse, false)?,
                }
            }
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                let body = self.suite(body, false)?;
                let mut rewritten = Vec::with_capacity(handlers.len());
                for mut handler in handlers {
                    handler.body = self.suite(handler.body, false)?;
                    rewritten.push(handler);
                }
                StmtKind::Try {
                    body,
                    handlers: rewritten,
                    orelse: self.suite(orelse, false)?,
                    finalbody: self.suite(finalbody, false)?,
                }
            }
            StmtKind::FunctionDef(def) => {
                let mut def = Arc::try_unwrap(def).unwrap_or_else(|shared| (*shared).clone());
                def.body = self.suite(def.body, true)?;
                StmtKind::FunctionDef(Arc::new(def))
            }
            StmtKind::Global(_) => {
                return Err(self.unsupported("The global statement is not supported", span.start));
            }
            StmtKind::Nonlocal(_) => {
                return Err(
                    self.unsupported("The nonlocal statement is not supported", span.start)
                );
            }
            other => other,
        };
        Ok(Stmt::new(kind, span))
    }

    #[cold]
    fn unsupported(&self, message: &str, offset: u32) -> UnsupportedConstructError {
        UnsupportedConstructError::new(message, self.lines.line(offset))
    }

    fn record(&mut self, path: MutationPath) {
        tracing::trace!(path = %path.describe(), "mutation");
        self.mutated.push(path);
    }

    /// Receivers of method calls in an expression statement.
    fn note_method_calls(&mut self, expr: &Expr) {
        let items = match &expr.kind {
            ExprKind::Tuple(items) => items.as_slice(),
            _ => std::slice::from_ref(expr),
        };
        for item in items {
            let ExprKind::Call { func, .. } = &item.kind else {
                continue;
            };
            let ExprKind::Attribute { value, attr } = &func.kind else {
                continue;
            };
            if !self.options.heuristic.is_mutator(attr) {
                continue;
            }
            if let Some(path) = MutationPath::from_expr(value) {
                self.record(path);
            }
        }
    }

    /// Container of an assignment or `del` target.
    fn note_container(&mut self, target: &Expr) {
        match &target.kind {
            ExprKind::Tuple(items) | ExprKind::List(items) => {
                for item in items {
                    self.note_container(item);
                }
            }
            ExprKind::Subscript { value, .. } | ExprKind::Attribute { value, .. } => {
                if let Some(path) = MutationPath::from_expr(value) {
                    self.record(path);
                }
            }
            _ => {}
        }
    }

    /// The full target of an augmented assignment.
    fn note_path(&mut self, target: &Expr) {
        if let Some(path) = MutationPath::from_expr(target) {
            self.record(path);
        }
    }
}
