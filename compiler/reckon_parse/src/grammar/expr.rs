//! Expression productions.
//!
//! Precedence, loosest first: `lambda`, conditional, `or`, `and`, `not`,
//! comparisons, `|`, `^`, `&`, shifts, `+ -`, `* / // %`, unary `+ - ~`,
//! `**`, trailers (call, subscript, attribute), atoms.

use std::sync::Arc;

use reckon_ir::{
    BinaryOp, BoolOp, CmpOp, Comprehension, Expr, ExprKind, FunctionDef, Keyword, Span, UnaryOp,
};
use reckon_stack::with_stack;

use super::stmt::lambda_body;
use super::{invalid_target, TargetUse};
use crate::cooker::{Op, Tok};
use crate::{ParseResult, Parser};

impl Parser<'_> {
    /// Whether the current token can begin an expression.
    fn starts_expr(&self) -> bool {
        match self.current_tok() {
            Tok::Name(_) | Tok::Int(_) | Tok::Float(_) | Tok::Str(_) => true,
            Tok::Keyword(k) => matches!(*k, "not" | "lambda"),
            Tok::Op(op) => matches!(
                op,
                Op::LParen
                    | Op::LBracket
                    | Op::LBrace
                    | Op::Backquote
                    | Op::Minus
                    | Op::Plus
                    | Op::Tilde
            ),
            _ => false,
        }
    }

    /// `test (',' test)* [',']`; a tuple when any comma is present.
    pub(crate) fn parse_testlist(&mut self) -> ParseResult<Expr> {
        self.parse_sequence(Self::parse_test)
    }

    /// `expr (',' expr)* [',']`: assignment targets of `for`.
    pub(crate) fn parse_exprlist(&mut self) -> ParseResult<Expr> {
        self.parse_sequence(Self::parse_expr)
    }

    /// The individual items of an exprlist (for `del`).
    pub(crate) fn parse_exprlist_items(&mut self) -> ParseResult<Vec<Expr>> {
        let mut items = vec![self.parse_expr()?];
        while self.cursor.eat_op(Op::Comma) {
            if !self.starts_expr() {
                break;
            }
            items.push(self.parse_expr()?);
        }
        Ok(items)
    }

    fn parse_sequence(
        &mut self,
        mut item: impl FnMut(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let start = self.current_span();
        let first = item(self)?;
        if !self.cursor.check_op(Op::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.cursor.eat_op(Op::Comma) {
            if !self.starts_expr() {
                break;
            }
            items.push(item(self)?);
        }
        Ok(Expr::new(ExprKind::Tuple(items), self.span_from(start)))
    }

    /// `or_test ['if' or_test 'else' test] | lambdef`
    pub(crate) fn parse_test(&mut self) -> ParseResult<Expr> {
        with_stack(|| self.parse_test_inner())
    }

    fn parse_test_inner(&mut self) -> ParseResult<Expr> {
        if self.cursor.check_keyword("lambda") {
            return self.parse_lambda();
        }
        let start = self.current_span();
        let body = self.parse_or_test()?;
        if !self.cursor.eat_keyword("if") {
            return Ok(body);
        }
        let test = self.parse_or_test()?;
        self.expect_keyword("else")?;
        let orelse = self.parse_test()?;
        Ok(Expr::new(
            ExprKind::IfExp {
                test: Box::new(test),
                body: Box::new(body),
                orelse: Box::new(orelse),
            },
            self.span_from(start),
        ))
    }

    fn parse_lambda(&mut self) -> ParseResult<Expr> {
        let start = self.expect_keyword("lambda")?;
        let params = self.parse_params(Op::Colon)?;
        self.expect_op(Op::Colon)?;
        let value = self.parse_test()?;
        let span = self.span_from(start);
        Ok(Expr::new(
            ExprKind::Lambda(Arc::new(FunctionDef {
                name: "<lambda>".to_owned(),
                params,
                body: lambda_body(value),
                span,
            })),
            span,
        ))
    }

    fn parse_or_test(&mut self) -> ParseResult<Expr> {
        self.parse_bool_chain("or", BoolOp::Or, Self::parse_and_test)
    }

    fn parse_and_test(&mut self) -> ParseResult<Expr> {
        self.parse_bool_chain("and", BoolOp::And, Self::parse_not_test)
    }

    fn parse_bool_chain(
        &mut self,
        keyword: &str,
        op: BoolOp,
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let start = self.current_span();
        let first = operand(self)?;
        if !self.cursor.check_keyword(keyword) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.cursor.eat_keyword(keyword) {
            values.push(operand(self)?);
        }
        Ok(Expr::new(
            ExprKind::BoolOp { op, values },
            self.span_from(start),
        ))
    }

    fn parse_not_test(&mut self) -> ParseResult<Expr> {
        if self.cursor.check_keyword("not") {
            let start = self.cursor.advance().span;
            let operand = with_stack(|| self.parse_not_test())?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                self.span_from(start),
            ));
        }
        self.parse_comparison()
    }

    fn comparison_op(&self) -> Option<(CmpOp, usize)> {
        let op = match self.current_tok() {
            Tok::Op(Op::EqEq) => CmpOp::Eq,
            Tok::Op(Op::NotEq) => CmpOp::NotEq,
            Tok::Op(Op::Lt) => CmpOp::Lt,
            Tok::Op(Op::LtE) => CmpOp::LtE,
            Tok::Op(Op::Gt) => CmpOp::Gt,
            Tok::Op(Op::GtE) => CmpOp::GtE,
            Tok::Keyword("in") => CmpOp::In,
            Tok::Keyword("not") if self.cursor.peek_tok(1) == &Tok::Keyword("in") => {
                return Some((CmpOp::NotIn, 2));
            }
            Tok::Keyword("is") if self.cursor.peek_tok(1) == &Tok::Keyword("not") => {
                return Some((CmpOp::IsNot, 2));
            }
            Tok::Keyword("is") => CmpOp::Is,
            _ => return None,
        };
        Some((op, 1))
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let start = self.current_span();
        let left = self.parse_expr()?;
        let mut ops = Vec::new();
        while let Some((op, width)) = self.comparison_op() {
            for _ in 0..width {
                self.cursor.advance();
            }
            ops.push((op, self.parse_expr()?));
        }
        if ops.is_empty() {
            return Ok(left);
        }
        Ok(Expr::new(
            ExprKind::Compare {
                left: Box::new(left),
                ops,
            },
            self.span_from(start),
        ))
    }

    /// Left-associative binary level.
    fn parse_binary_level(
        &mut self,
        op_for: fn(&Tok) -> Option<BinaryOp>,
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let start = self.current_span();
        let mut left = operand(self)?;
        while let Some(op) = op_for(self.current_tok()) {
            self.cursor.advance();
            let right = operand(self)?;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                self.span_from(start),
            );
        }
        Ok(left)
    }

    /// `xor_expr ('|' xor_expr)*`
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(
            |t| matches!(t, Tok::Op(Op::Pipe)).then_some(BinaryOp::BitOr),
            Self::parse_xor,
        )
    }

    fn parse_xor(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(
            |t| matches!(t, Tok::Op(Op::Caret)).then_some(BinaryOp::BitXor),
            Self::parse_bitand,
        )
    }

    fn parse_bitand(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(
            |t| matches!(t, Tok::Op(Op::Amp)).then_some(BinaryOp::BitAnd),
            Self::parse_shift,
        )
    }

    fn parse_shift(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(
            |t| match t {
                Tok::Op(Op::LShift) => Some(BinaryOp::LShift),
                Tok::Op(Op::RShift) => Some(BinaryOp::RShift),
                _ => None,
            },
            Self::parse_arith,
        )
    }

    fn parse_arith(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(
            |t| match t {
                Tok::Op(Op::Plus) => Some(BinaryOp::Add),
                Tok::Op(Op::Minus) => Some(BinaryOp::Sub),
                _ => None,
            },
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(
            |t| match t {
                Tok::Op(Op::Star) => Some(BinaryOp::Mul),
                Tok::Op(Op::Slash) => Some(BinaryOp::Div),
                Tok::Op(Op::DoubleSlash) => Some(BinaryOp::FloorDiv),
                Tok::Op(Op::Percent) => Some(BinaryOp::Mod),
                _ => None,
            },
            Self::parse_factor,
        )
    }

    /// `('+'|'-'|'~') factor | power`
    fn parse_factor(&mut self) -> ParseResult<Expr> {
        let op = match self.current_tok() {
            Tok::Op(Op::Minus) => UnaryOp::Neg,
            Tok::Op(Op::Plus) => UnaryOp::Pos,
            Tok::Op(Op::Tilde) => UnaryOp::Invert,
            _ => return self.parse_power(),
        };
        let start = self.cursor.advance().span;
        let operand = with_stack(|| self.parse_factor())?;
        if let (UnaryOp::Neg, ExprKind::Int(v)) = (op, &operand.kind) {
            if let Some(neg) = v.checked_neg() {
                return Ok(Expr::new(ExprKind::Int(neg), self.span_from(start)));
            }
        }
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            self.span_from(start),
        ))
    }

    /// `atom trailer* ['**' factor]`
    fn parse_power(&mut self) -> ParseResult<Expr> {
        let start = self.current_span();
        let mut expr = self.parse_atom()?;
        loop {
            if self.cursor.eat_op(Op::LParen) {
                let (args, keywords) = self.parse_arglist()?;
                self.expect_op(Op::RParen)?;
                expr = Expr::new(
                    ExprKind::Call {
                        func: Box::new(expr),
                        args,
                        keywords,
                    },
                    self.span_from(start),
                );
            } else if self.cursor.eat_op(Op::LBracket) {
                let index = self.parse_subscript_list()?;
                self.expect_op(Op::RBracket)?;
                expr = Expr::new(
                    ExprKind::Subscript {
                        value: Box::new(expr),
                        index: Box::new(index),
                    },
                    self.span_from(start),
                );
            } else if self.cursor.eat_op(Op::Dot) {
                let attr = self.expect_name()?;
                expr = Expr::new(
                    ExprKind::Attribute {
                        value: Box::new(expr),
                        attr,
                    },
                    self.span_from(start),
                );
            } else {
                break;
            }
        }
        if self.cursor.eat_op(Op::DoubleStar) {
            let exponent = with_stack(|| self.parse_factor())?;
            expr = Expr::new(
                ExprKind::Binary {
                    op: BinaryOp::Pow,
                    left: Box::new(expr),
                    right: Box::new(exponent),
                },
                self.span_from(start),
            );
        }
        Ok(expr)
    }

    /// Call arguments up to the closing parenthesis.
    fn parse_arglist(&mut self) -> ParseResult<(Vec<Expr>, Vec<Keyword>)> {
        let mut args = Vec::new();
        let mut keywords: Vec<Keyword> = Vec::new();
        while !self.cursor.check_op(Op::RParen) {
            if self.cursor.check_op(Op::Star) || self.cursor.check_op(Op::DoubleStar) {
                return Err(self.unsupported(
                    "argument unpacking is not supported",
                    self.current_span(),
                ));
            }
            let span = self.current_span();
            let keyword_name = match (self.current_tok(), self.cursor.peek_tok(1)) {
                (Tok::Name(name), Tok::Op(Op::Assign)) => Some(name.clone()),
                _ => None,
            };
            if let Some(name) = keyword_name {
                self.cursor.advance();
                self.cursor.advance();
                if keywords.iter().any(|k| k.name == name) {
                    return Err(self.error_at("keyword argument repeated", span));
                }
                let value = self.parse_test()?;
                keywords.push(Keyword { name, value });
            } else {
                if !keywords.is_empty() {
                    return Err(self.error_at("non-keyword arg after keyword arg", span));
                }
                args.push(self.parse_test()?);
                if self.cursor.check_keyword("for") {
                    return Err(self.unsupported(
                        "generator expressions are not supported",
                        self.current_span(),
                    ));
                }
            }
            if !self.cursor.eat_op(Op::Comma) {
                break;
            }
        }
        Ok((args, keywords))
    }

    fn parse_subscript_list(&mut self) -> ParseResult<Expr> {
        let start = self.current_span();
        let first = self.parse_subscript()?;
        if !self.cursor.check_op(Op::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.cursor.eat_op(Op::Comma) {
            if self.cursor.check_op(Op::RBracket) {
                break;
            }
            items.push(self.parse_subscript()?);
        }
        Ok(Expr::new(ExprKind::Tuple(items), self.span_from(start)))
    }

    /// `test | [test] ':' [test] [':' [test]]`
    fn parse_subscript(&mut self) -> ParseResult<Expr> {
        let start = self.current_span();
        let lower = if self.cursor.check_op(Op::Colon) {
            None
        } else {
            let index = self.parse_test()?;
            if !self.cursor.check_op(Op::Colon) {
                return Ok(index);
            }
            Some(Box::new(index))
        };
        self.expect_op(Op::Colon)?;
        let upper = if self.at_slice_item_end() || self.cursor.check_op(Op::Colon) {
            None
        } else {
            Some(Box::new(self.parse_test()?))
        };
        let step = if self.cursor.eat_op(Op::Colon) && !self.at_slice_item_end() {
            Some(Box::new(self.parse_test()?))
        } else {
            None
        };
        Ok(Expr::new(
            ExprKind::Slice { lower, upper, step },
            self.span_from(start),
        ))
    }

    fn at_slice_item_end(&self) -> bool {
        self.cursor.check_op(Op::RBracket) || self.cursor.check_op(Op::Comma)
    }

    fn parse_atom(&mut self) -> ParseResult<Expr> {
        let start = self.current_span();
        let kind = match self.current_tok() {
            Tok::Name(name) => {
                let kind = match name.as_str() {
                    "None" => ExprKind::NoneLit,
                    "True" => ExprKind::Bool(true),
                    "False" => ExprKind::Bool(false),
                    _ => ExprKind::Name(name.clone()),
                };
                self.cursor.advance();
                kind
            }
            Tok::Int(v) => {
                self.cursor.advance();
                ExprKind::Int(*v)
            }
            Tok::Float(v) => {
                self.cursor.advance();
                ExprKind::Float(*v)
            }
            Tok::Str(_) => {
                let mut value = String::new();
                while let Tok::Str(s) = self.current_tok() {
                    value.push_str(s);
                    self.cursor.advance();
                }
                ExprKind::Str(value)
            }
            Tok::Op(Op::LParen) => {
                self.cursor.advance();
                return self.parse_paren(start);
            }
            Tok::Op(Op::LBracket) => {
                self.cursor.advance();
                self.parse_list_display()?
            }
            Tok::Op(Op::LBrace) => {
                self.cursor.advance();
                self.parse_dict_display()?
            }
            Tok::Op(Op::Backquote) => {
                self.cursor.advance();
                let inner = self.parse_testlist()?;
                self.expect_op(Op::Backquote)?;
                ExprKind::Repr(Box::new(inner))
            }
            _ => return Err(self.unexpected()),
        };
        Ok(Expr::new(kind, self.span_from(start)))
    }

    /// After `(`: empty tuple, parenthesized expression or tuple.
    fn parse_paren(&mut self, start: Span) -> ParseResult<Expr> {
        if self.cursor.eat_op(Op::RParen) {
            return Ok(Expr::new(ExprKind::Tuple(Vec::new()), self.span_from(start)));
        }
        let first = self.parse_test()?;
        if self.cursor.check_keyword("for") {
            return Err(self.unsupported(
                "generator expressions are not supported",
                self.current_span(),
            ));
        }
        if self.cursor.eat_op(Op::RParen) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.cursor.eat_op(Op::Comma) {
            if self.cursor.check_op(Op::RParen) {
                break;
            }
            items.push(self.parse_test()?);
        }
        self.expect_op(Op::RParen)?;
        Ok(Expr::new(ExprKind::Tuple(items), self.span_from(start)))
    }

    /// After `[`.
    fn parse_list_display(&mut self) -> ParseResult<ExprKind> {
        if self.cursor.eat_op(Op::RBracket) {
            return Ok(ExprKind::List(Vec::new()));
        }
        let first = self.parse_test()?;
        if self.cursor.check_keyword("for") {
            let generators = self.parse_comprehension_clauses()?;
            self.expect_op(Op::RBracket)?;
            return Ok(ExprKind::ListComp {
                elt: Box::new(first),
                generators,
            });
        }
        let mut items = vec![first];
        while self.cursor.eat_op(Op::Comma) {
            if self.cursor.check_op(Op::RBracket) {
                break;
            }
            items.push(self.parse_test()?);
        }
        self.expect_op(Op::RBracket)?;
        Ok(ExprKind::List(items))
    }

    /// `('for' exprlist 'in' or_test ('if' or_test)*)+`
    fn parse_comprehension_clauses(&mut self) -> ParseResult<Vec<Comprehension>> {
        let mut generators = Vec::new();
        while self.cursor.eat_keyword("for") {
            let target = self.parse_exprlist()?;
            if let Some(message) = invalid_target(&target, TargetUse::Assign) {
                return Err(self.error_at(&message, target.span));
            }
            self.expect_keyword("in")?;
            let iter = self.parse_or_test()?;
            let mut ifs = Vec::new();
            while self.cursor.eat_keyword("if") {
                ifs.push(self.parse_or_test()?);
            }
            generators.push(Comprehension { target, iter, ifs });
        }
        Ok(generators)
    }

    /// After `{`.
    fn parse_dict_display(&mut self) -> ParseResult<ExprKind> {
        let mut entries = Vec::new();
        while !self.cursor.check_op(Op::RBrace) {
            let key = self.parse_test()?;
            self.expect_op(Op::Colon)?;
            let value = self.parse_test()?;
            entries.push((key, value));
            if !self.cursor.eat_op(Op::Comma) {
                break;
            }
        }
        self.expect_op(Op::RBrace)?;
        Ok(ExprKind::Dict(entries))
    }
}
