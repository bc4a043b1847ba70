//! Token cooking: line tokens to parser tokens.
//!
//! The worksheet lexer is line-oriented and never fails. The parser wants
//! a Python-style stream instead: values decoded, comments dropped,
//! multi-line strings joined, and `NEWLINE`/`INDENT`/`DEDENT` synthesized
//! from the layout. The cooker drives [`tokenize_line`] over a statement's
//! lines, carrying the lexical stack, and builds that stream.
//!
//! Physical lines join into one logical line while a bracket or string is
//! open or after a trailing `\`. Blank and comment-only lines produce no
//! tokens at all.

use reckon_ir::{BinaryOp, Span};
use reckon_lexer::{tokenize_line, LexStack, Token as LineToken, TokenKind, KEYWORDS};

use crate::cook_escape::{cook_number, cook_string, Number};
use crate::SyntaxError;

/// Operators and delimiters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Op {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Backquote,
    Colon,
    Comma,
    Semi,
    Dot,
    At,
    Tilde,
    Assign,
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LShift,
    RShift,
    Amp,
    Pipe,
    Caret,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtE,
    GtE,
    /// `+=` and friends.
    Aug(BinaryOp),
}

impl Op {
    fn from_text(text: &str) -> Option<Op> {
        let op = match text {
            "(" => Op::LParen,
            ")" => Op::RParen,
            "[" => Op::LBracket,
            "]" => Op::RBracket,
            "{" => Op::LBrace,
            "}" => Op::RBrace,
            "`" => Op::Backquote,
            ":" => Op::Colon,
            "," => Op::Comma,
            ";" => Op::Semi,
            "." => Op::Dot,
            "@" => Op::At,
            "~" => Op::Tilde,
            "=" => Op::Assign,
            "+" => Op::Plus,
            "-" => Op::Minus,
            "*" => Op::Star,
            "**" => Op::DoubleStar,
            "/" => Op::Slash,
            "//" => Op::DoubleSlash,
            "%" => Op::Percent,
            "<<" => Op::LShift,
            ">>" => Op::RShift,
            "&" => Op::Amp,
            "|" => Op::Pipe,
            "^" => Op::Caret,
            "==" => Op::EqEq,
            "!=" | "<>" => Op::NotEq,
            "<" => Op::Lt,
            ">" => Op::Gt,
            "<=" => Op::LtE,
            ">=" => Op::GtE,
            _ => {
                let base = text.strip_suffix('=')?;
                return aug_op(base).map(Op::Aug);
            }
        };
        Some(op)
    }
}

fn aug_op(base: &str) -> Option<BinaryOp> {
    Some(match base {
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        "//" => BinaryOp::FloorDiv,
        "%" => BinaryOp::Mod,
        "**" => BinaryOp::Pow,
        "<<" => BinaryOp::LShift,
        ">>" => BinaryOp::RShift,
        "&" => BinaryOp::BitAnd,
        "|" => BinaryOp::BitOr,
        "^" => BinaryOp::BitXor,
        _ => return None,
    })
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Tok {
    Name(String),
    Keyword(&'static str),
    Int(i64),
    Float(f64),
    Str(String),
    Op(Op),
    Newline,
    Indent,
    Dedent,
    EndMarker,
}

/// A parser token; `span` is a byte range into the statement text.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub tok: Tok,
    pub span: Span,
}

/// Cook the text of one statement. The stream always ends with
/// [`Tok::EndMarker`].
pub(crate) fn cook(text: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut cooker = TokenCooker::new();
    let mut base = 0;
    let mut last = (0, 0);
    for (line_no, line) in text.split('\n').enumerate() {
        let line_no = to_u32(line_no);
        cooker.cook_line(line_no, base, line)?;
        last = (line_no, line.len());
        base += line.len() + 1;
    }
    cooker.finish(last.0, last.1, base.saturating_sub(1))
}

/// A string literal spanning several physical lines.
struct PendingString {
    raw: String,
    start: usize,
    line: u32,
    col: usize,
}

struct TokenCooker {
    out: Vec<Token>,
    indents: Vec<usize>,
    stack: LexStack,
    in_logical_line: bool,
    prev_continued: bool,
    pending: Option<PendingString>,
}

impl TokenCooker {
    fn new() -> Self {
        TokenCooker {
            out: Vec::new(),
            indents: vec![0],
            stack: LexStack::new(),
            in_logical_line: false,
            prev_continued: false,
            pending: None,
        }
    }

    fn push(&mut self, tok: Tok, start: usize, end: usize) {
        self.out.push(Token {
            tok,
            span: Span::new(to_u32(start), to_u32(end)),
        });
    }

    fn cook_line(&mut self, line_no: u32, base: usize, line: &str) -> Result<(), SyntaxError> {
        let (tokens, next_stack) = tokenize_line(line, &self.stack);
        let resuming = self.stack.last().is_some_and(|d| d.is_string());
        let joined = !self.stack.is_empty() || self.in_logical_line;
        let continued = tokens
            .last()
            .is_some_and(|t| t.kind == TokenKind::Continuation);
        let first_significant = tokens
            .iter()
            .find(|t| !matches!(t.kind, TokenKind::Comment | TokenKind::Continuation));

        if !joined {
            let Some(first) = first_significant else {
                self.stack = next_stack;
                self.prev_continued = false;
                return Ok(());
            };
            self.indent(line_no, base, line, first.start)?;
        }

        let mut rest = tokens.iter();
        if resuming {
            if let Some(tok) = rest.next() {
                self.resume_string(tok, line_no, base, line)?;
            }
        }
        for tok in rest {
            self.cook_token(tok, line_no, base, line)?;
        }

        self.stack = next_stack;
        self.prev_continued = continued;
        if self.stack.is_empty() && !continued && self.in_logical_line {
            let end = base + line.len();
            self.push(Tok::Newline, end, end);
            self.in_logical_line = false;
        }
        Ok(())
    }

    fn indent(
        &mut self,
        line_no: u32,
        base: usize,
        line: &str,
        first: usize,
    ) -> Result<(), SyntaxError> {
        let width = indent_width(&line[..first]);
        let top = self.indents.last().copied().unwrap_or(0);
        if width > top {
            self.indents.push(width);
            self.push(Tok::Indent, base, base + first);
        } else if width < top {
            while self.indents.last().is_some_and(|&i| i > width) {
                self.indents.pop();
                self.push(Tok::Dedent, base + first, base + first);
            }
            if self.indents.last().copied().unwrap_or(0) != width {
                return Err(SyntaxError::new(
                    "unindent does not match any outer indentation level",
                    line_no,
                    to_u32(first),
                ));
            }
        }
        Ok(())
    }

    fn resume_string(
        &mut self,
        tok: &LineToken,
        line_no: u32,
        base: usize,
        line: &str,
    ) -> Result<(), SyntaxError> {
        let Some(pending) = self.pending.as_mut() else {
            return Err(SyntaxError::invalid_syntax(line_no, to_u32(tok.start)));
        };
        if !self.prev_continued {
            pending.raw.push('\n');
        }
        pending.raw.push_str(tok.text(line));
        if tok.is_close() {
            if let Some(done) = self.pending.take() {
                let value = cook_string(&done.raw)
                    .map_err(|m| SyntaxError::new(m, done.line, to_u32(done.col)))?;
                self.push(Tok::Str(value), done.start, base + tok.end);
            }
        }
        self.in_logical_line = true;
        Ok(())
    }

    fn cook_token(
        &mut self,
        tok: &LineToken,
        line_no: u32,
        base: usize,
        line: &str,
    ) -> Result<(), SyntaxError> {
        let text = tok.text(line);
        let col = to_u32(tok.start);
        let cooked = match tok.kind {
            TokenKind::Comment | TokenKind::Continuation => return Ok(()),
            TokenKind::Junk => return Err(SyntaxError::invalid_syntax(line_no, col)),
            TokenKind::String if tok.is_open() => {
                self.pending = Some(PendingString {
                    raw: text.to_owned(),
                    start: base + tok.start,
                    line: line_no,
                    col: tok.start,
                });
                self.in_logical_line = true;
                return Ok(());
            }
            TokenKind::String => {
                Tok::Str(cook_string(text).map_err(|m| SyntaxError::new(m, line_no, col))?)
            }
            TokenKind::Keyword => match KEYWORDS.iter().copied().find(|k| *k == text) {
                Some(k) => Tok::Keyword(k),
                None => Tok::Name(text.to_owned()),
            },
            TokenKind::Name | TokenKind::BuiltinConstant => Tok::Name(text.to_owned()),
            TokenKind::Number => match cook_number(text) {
                Ok(Number::Int(v)) => Tok::Int(v),
                Ok(Number::Float(v)) => Tok::Float(v),
                Err(m) => return Err(SyntaxError::new(m, line_no, col)),
            },
            _ => Tok::Op(Op::from_text(text).ok_or_else(|| SyntaxError::invalid_syntax(line_no, col))?),
        };
        self.push(cooked, base + tok.start, base + tok.end);
        self.in_logical_line = true;
        Ok(())
    }

    fn finish(mut self, line: u32, col: usize, end: usize) -> Result<Vec<Token>, SyntaxError> {
        if let Some(&top) = self.stack.last() {
            let message = if top.is_string() {
                "EOF while scanning triple-quoted string literal"
            } else {
                "unexpected EOF while parsing"
            };
            return Err(SyntaxError::new(message, line, to_u32(col)));
        }
        if self.in_logical_line {
            self.push(Tok::Newline, end, end);
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push(Tok::Dedent, end, end);
        }
        self.push(Tok::EndMarker, end, end);
        Ok(self.out)
    }
}

/// Visual width of leading whitespace; tabs advance to the next multiple
/// of eight.
fn indent_width(prefix: &str) -> usize {
    prefix.bytes().fold(0, |width, b| match b {
        b'\t' => (width / 8 + 1) * 8,
        0x0C => 0,
        _ => width + 1,
    })
}

#[inline]
fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
