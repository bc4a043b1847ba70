//! Grammar productions, as `impl Parser` blocks.
//!
//! - `stmt.rs`: module, suites, simple and compound statements
//! - `expr.rs`: the expression precedence chain, atoms and trailers

mod expr;
mod stmt;

use reckon_ir::{Expr, ExprKind};

/// What a target expression is being used for, for error messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TargetUse {
    Assign,
    Delete,
}

impl TargetUse {
    fn verb(self) -> &'static str {
        match self {
            TargetUse::Assign => "assign to",
            TargetUse::Delete => "delete",
        }
    }
}

/// Why `expr` cannot be assigned to or deleted, if it cannot.
pub(crate) fn invalid_target(expr: &Expr, usage: TargetUse) -> Option<String> {
    let what = match &expr.kind {
        ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. } => {
            return None
        }
        ExprKind::Tuple(items) | ExprKind::List(items) => {
            return items.iter().find_map(|e| invalid_target(e, usage));
        }
        ExprKind::Call { .. } => "function call",
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::NoneLit
        | ExprKind::Bool(_) => "literal",
        ExprKind::ListComp { .. } => "list comprehension",
        ExprKind::Lambda(_) => "lambda",
        ExprKind::Repr(_) => "repr",
        ExprKind::Compare { .. } => "comparison",
        ExprKind::IfExp { .. } => "conditional expression",
        ExprKind::Dict(_) => "literal",
        _ => "operator",
    };
    Some(format!("can't {} {what}", usage.verb()))
}
