//! Statement productions.

use std::sync::Arc;

use reckon_ir::{
    ExceptHandler, Expr, ExprKind, FunctionDef, Module, Param, PrintTarget, Stmt, StmtKind, Suite,
};
use reckon_stack::with_stack;

use super::{invalid_target, TargetUse};
use crate::cooker::{Op, Tok};
use crate::{ParseResult, Parser};

/// Keywords the grammar recognizes but a worksheet cannot run.
const UNSUPPORTED_KEYWORDS: &[&str] = &["class", "exec", "from", "import", "with", "yield"];

impl Parser<'_> {
    /// Parse the whole statement text.
    pub(crate) fn parse_module(&mut self) -> ParseResult<Module> {
        let mut body = Vec::new();
        loop {
            match self.current_tok() {
                Tok::EndMarker => break,
                Tok::Newline => {
                    self.cursor.advance();
                }
                Tok::Indent => return Err(self.unexpected()),
                _ => self.parse_statement(&mut body)?,
            }
        }
        Ok(Module { body })
    }

    /// Parse one line's worth of statements (or one compound statement)
    /// into `out`.
    fn parse_statement(&mut self, out: &mut Suite) -> ParseResult<()> {
        with_stack(|| {
            let keyword = match self.current_tok() {
                Tok::Keyword(k) => Some(*k),
                _ => None,
            };
            match keyword {
                Some("if") => out.push(self.parse_if()?),
                Some("while") => out.push(self.parse_while()?),
                Some("for") => out.push(self.parse_for()?),
                Some("try") => out.push(self.parse_try()?),
                Some("def") => out.push(self.parse_def()?),
                _ => self.parse_simple_line(out)?,
            }
            Ok(())
        })
    }

    /// `small_stmt (';' small_stmt)* [';'] NEWLINE`
    fn parse_simple_line(&mut self, out: &mut Suite) -> ParseResult<()> {
        loop {
            out.push(self.parse_small_stmt()?);
            if !self.cursor.eat_op(Op::Semi) || self.cursor.check(&Tok::Newline) {
                break;
            }
        }
        if self.cursor.check(&Tok::Newline) {
            self.cursor.advance();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// `':' (simple_line | NEWLINE INDENT stmt+ DEDENT)`
    fn parse_suite(&mut self) -> ParseResult<Suite> {
        self.expect_op(Op::Colon)?;
        let mut body = Vec::new();
        if !self.cursor.check(&Tok::Newline) {
            self.parse_simple_line(&mut body)?;
            return Ok(body);
        }
        self.cursor.advance();
        if !self.cursor.check(&Tok::Indent) {
            return Err(self.error_at("expected an indented block", self.current_span()));
        }
        self.cursor.advance();
        loop {
            match self.current_tok() {
                Tok::Dedent => {
                    self.cursor.advance();
                    break;
                }
                Tok::EndMarker => break,
                Tok::Newline => {
                    self.cursor.advance();
                }
                _ => self.parse_statement(&mut body)?,
            }
        }
        Ok(body)
    }

    /// True at the end of a small statement.
    fn at_small_end(&self) -> bool {
        matches!(
            self.current_tok(),
            Tok::Newline | Tok::EndMarker | Tok::Op(Op::Semi)
        )
    }

    fn parse_small_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        let keyword = match self.current_tok() {
            Tok::Keyword(k) => Some(*k),
            _ => None,
        };
        let kind = match keyword {
            Some("print") => {
                self.cursor.advance();
                self.parse_print()?
            }
            Some("del") => {
                self.cursor.advance();
                let targets = self.parse_exprlist_items()?;
                for target in &targets {
                    if let Some(message) = invalid_target(target, TargetUse::Delete) {
                        return Err(self.error_at(&message, target.span));
                    }
                }
                StmtKind::Del(targets)
            }
            Some("pass") => {
                self.cursor.advance();
                StmtKind::Pass
            }
            Some("break") => {
                let span = self.cursor.advance().span;
                if self.loop_depth == 0 {
                    return Err(self.error_at("'break' outside loop", span));
                }
                StmtKind::Break
            }
            Some("continue") => {
                let span = self.cursor.advance().span;
                if self.loop_depth == 0 {
                    return Err(self.error_at("'continue' not properly in loop", span));
                }
                StmtKind::Continue
            }
            Some("return") => {
                let span = self.cursor.advance().span;
                if self.function_depth == 0 {
                    return Err(self.error_at("'return' outside function", span));
                }
                if self.at_small_end() {
                    StmtKind::Return(None)
                } else {
                    StmtKind::Return(Some(self.parse_testlist()?))
                }
            }
            Some("raise") => {
                self.cursor.advance();
                if self.at_small_end() {
                    StmtKind::Raise(None)
                } else {
                    StmtKind::Raise(Some(self.parse_test()?))
                }
            }
            Some("assert") => {
                self.cursor.advance();
                let test = self.parse_test()?;
                let msg = if self.cursor.eat_op(Op::Comma) {
                    Some(self.parse_test()?)
                } else {
                    None
                };
                StmtKind::Assert { test, msg }
            }
            Some(kw @ ("global" | "nonlocal")) => {
                self.cursor.advance();
                let mut names = vec![self.expect_name()?];
                while self.cursor.eat_op(Op::Comma) {
                    names.push(self.expect_name()?);
                }
                if kw == "global" {
                    StmtKind::Global(names)
                } else {
                    StmtKind::Nonlocal(names)
                }
            }
            Some(kw) if UNSUPPORTED_KEYWORDS.contains(&kw) => {
                return Err(self.unsupported(&format!("'{kw}' is not supported"), start));
            }
            Some("def" | "if" | "while" | "for" | "try" | "else" | "elif" | "except" | "finally") => {
                return Err(self.unexpected());
            }
            _ => self.parse_expr_stmt()?,
        };
        Ok(Stmt::new(kind, self.span_from(start)))
    }

    /// After `print`.
    fn parse_print(&mut self) -> ParseResult<StmtKind> {
        let target = if self.cursor.eat_op(Op::RShift) {
            let dest = self.parse_test()?;
            if !self.cursor.eat_op(Op::Comma) {
                return Ok(StmtKind::Print {
                    target: PrintTarget::Stream(dest),
                    values: Vec::new(),
                    newline: true,
                });
            }
            PrintTarget::Stream(dest)
        } else {
            PrintTarget::Stdout
        };
        let mut values = Vec::new();
        let mut newline = true;
        while !self.at_small_end() {
            values.push(self.parse_test()?);
            newline = !self.cursor.eat_op(Op::Comma);
            if newline {
                break;
            }
        }
        Ok(StmtKind::Print {
            target,
            values,
            newline,
        })
    }

    /// Expression statement, assignment or augmented assignment.
    fn parse_expr_stmt(&mut self) -> ParseResult<StmtKind> {
        let first = self.parse_testlist()?;
        if let Tok::Op(Op::Aug(op)) = self.current_tok() {
            let op = *op;
            if !matches!(
                first.kind,
                ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. }
            ) {
                return Err(self.error_at(
                    "illegal expression for augmented assignment",
                    first.span,
                ));
            }
            self.cursor.advance();
            let value = self.parse_testlist()?;
            return Ok(StmtKind::AugAssign {
                target: first,
                op,
                value,
            });
        }
        if !self.cursor.check_op(Op::Assign) {
            return Ok(StmtKind::Expr(first));
        }
        let mut targets = vec![first];
        let value = loop {
            self.cursor.advance();
            let next = self.parse_testlist()?;
            if !self.cursor.check_op(Op::Assign) {
                break next;
            }
            targets.push(next);
        };
        for target in &targets {
            if let Some(message) = invalid_target(target, TargetUse::Assign) {
                return Err(self.error_at(&message, target.span));
            }
        }
        Ok(StmtKind::Assign { targets, value })
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let start = self.expect_keyword("if")?;
        let test = self.parse_test()?;
        let body = self.parse_suite()?;
        let mut branches = vec![(start, test, body)];
        while self.cursor.check_keyword("elif") {
            let span = self.cursor.advance().span;
            let test = self.parse_test()?;
            let body = self.parse_suite()?;
            branches.push((span, test, body));
        }
        let mut orelse = self.parse_else()?;
        let end = self.previous_span();
        while let Some((span, test, body)) = branches.pop() {
            let stmt = Stmt::new(
                StmtKind::If { test, body, orelse },
                span.merge(end),
            );
            orelse = vec![stmt];
        }
        orelse
            .pop()
            .ok_or_else(|| self.error_at("invalid syntax", start))
    }

    /// Optional `else` suite.
    fn parse_else(&mut self) -> ParseResult<Suite> {
        if self.cursor.eat_keyword("else") {
            self.parse_suite()
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let start = self.expect_keyword("while")?;
        let test = self.parse_test()?;
        let body = self.parse_loop_body()?;
        let orelse = self.parse_else()?;
        Ok(Stmt::new(
            StmtKind::While { test, body, orelse },
            self.span_from(start),
        ))
    }

    fn parse_for(&mut self) -> ParseResult<Stmt> {
        let start = self.expect_keyword("for")?;
        let target = self.parse_exprlist()?;
        if let Some(message) = invalid_target(&target, TargetUse::Assign) {
            return Err(self.error_at(&message, target.span));
        }
        self.expect_keyword("in")?;
        let iter = self.parse_testlist()?;
        let body = self.parse_loop_body()?;
        let orelse = self.parse_else()?;
        Ok(Stmt::new(
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            },
            self.span_from(start),
        ))
    }

    fn parse_try(&mut self) -> ParseResult<Stmt> {
        let start = self.expect_keyword("try")?;
        let body = self.parse_suite()?;
        let mut handlers: Vec<ExceptHandler> = Vec::new();
        while self.cursor.check_keyword("except") {
            let span = self.cursor.advance().span;
            if handlers.last().is_some_and(|h| h.kind.is_none()) {
                return Err(self.error_at("default 'except:' must be last", span));
            }
            let mut kind = None;
            let mut name = None;
            if !self.cursor.check_op(Op::Colon) {
                kind = Some(self.parse_test()?);
                if self.cursor.eat_keyword("as") || self.cursor.eat_op(Op::Comma) {
                    name = Some(self.expect_name()?);
                }
            }
            let body = self.parse_suite()?;
            handlers.push(ExceptHandler { kind, name, body });
        }
        let orelse = if handlers.is_empty() {
            Vec::new()
        } else {
            self.parse_else()?
        };
        let finalbody = if self.cursor.eat_keyword("finally") {
            self.parse_suite()?
        } else {
            Vec::new()
        };
        if handlers.is_empty() && finalbody.is_empty() {
            return Err(self.unexpected());
        }
        Ok(Stmt::new(
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            },
            self.span_from(start),
        ))
    }

    fn parse_def(&mut self) -> ParseResult<Stmt> {
        let start = self.expect_keyword("def")?;
        let name = self.expect_name()?;
        self.expect_op(Op::LParen)?;
        let params = self.parse_params(Op::RParen)?;
        self.expect_op(Op::RParen)?;
        let body = self.parse_function_body()?;
        let span = self.span_from(start);
        Ok(Stmt::new(
            StmtKind::FunctionDef(Arc::new(FunctionDef {
                name,
                params,
                body,
                span,
            })),
            span,
        ))
    }

    fn parse_loop_body(&mut self) -> ParseResult<Suite> {
        self.loop_depth += 1;
        let body = self.parse_suite();
        self.loop_depth -= 1;
        body
    }

    /// A function body starts outside any loop.
    fn parse_function_body(&mut self) -> ParseResult<Suite> {
        let loops = std::mem::take(&mut self.loop_depth);
        self.function_depth += 1;
        let body = self.parse_suite();
        self.function_depth -= 1;
        self.loop_depth = loops;
        body
    }

    /// Parameter list up to (not including) `close`.
    pub(super) fn parse_params(&mut self, close: Op) -> ParseResult<Vec<Param>> {
        let mut params: Vec<Param> = Vec::new();
        while !self.cursor.check_op(close) {
            if self.cursor.check_op(Op::Star) || self.cursor.check_op(Op::DoubleStar) {
                return Err(self.unsupported(
                    "variable argument lists are not supported",
                    self.current_span(),
                ));
            }
            let span = self.current_span();
            let name = self.expect_name()?;
            if params.iter().any(|p| p.name == name) {
                return Err(self.error_at(
                    &format!("duplicate argument '{name}' in function definition"),
                    span,
                ));
            }
            let default = if self.cursor.eat_op(Op::Assign) {
                Some(self.parse_test()?)
            } else {
                None
            };
            if default.is_none() && params.iter().any(|p| p.default.is_some()) {
                return Err(self.error_at("non-default argument follows default argument", span));
            }
            params.push(Param { name, default });
            if !self.cursor.eat_op(Op::Comma) {
                break;
            }
        }
        Ok(params)
    }
}

/// Body of a `lambda`: a single `return`.
pub(super) fn lambda_body(value: Expr) -> Suite {
    let span = value.span;
    vec![Stmt::new(StmtKind::Return(Some(value)), span)]
}
