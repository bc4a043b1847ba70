//! Reckon parser - statement text to rewritten syntax tree.
//!
//! # Pipeline
//!
//! ```text
//! text → TokenCooker → [Token] → Parser → Module → rewrite → Program
//! ```
//!
//! - [`cooker`](crate::cooker) turns the line tokens of `reckon_lexer` into
//!   a layout-aware stream (`NEWLINE`/`INDENT`/`DEDENT`) with decoded
//!   literal values.
//! - The recursive descent [`Parser`] builds a [`Module`].
//! - [`rewrite`] turns bare expressions into output-hook calls, routes
//!   `print` to the print hook and records the mutation paths that must be
//!   copied before the statement runs.

mod cook_escape;
mod cooker;
mod cursor;
mod error;
mod grammar;
mod rewrite;

pub use error::{CompileError, SyntaxError, UnsupportedConstructError};
pub use rewrite::{rewrite, GetterPrefixes, MutatorHeuristic, RewriteOptions};

use reckon_ir::{LineMap, Module, Mutation, Span};

use crate::cooker::{Tok, Token};
use crate::cursor::Cursor;

pub(crate) type ParseResult<T> = Result<T, CompileError>;

/// A compiled statement, ready to execute.
#[derive(Clone, Debug)]
pub struct Program {
    /// Rewritten syntax tree.
    pub module: Module,
    /// Paths to shallow-copy before executing, shortest first.
    pub mutations: Vec<Mutation>,
    /// Maps node spans back to statement-relative lines.
    pub lines: LineMap,
}

/// Parse statement text without rewriting.
pub fn parse(text: &str) -> Result<Module, CompileError> {
    parse_with_lines(text, &LineMap::new(text))
}

fn parse_with_lines(text: &str, lines: &LineMap) -> Result<Module, CompileError> {
    let tokens = cooker::cook(text)?;
    let mut parser = Parser::new(&tokens, lines);
    parser.parse_module()
}

/// Parse and rewrite statement text.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compile(text: &str, options: &RewriteOptions) -> Result<Program, CompileError> {
    let lines = LineMap::new(text);
    let module = parse_with_lines(text, &lines)?;
    let (module, mutations) = rewrite(module, &lines, options)?;
    tracing::debug!(mutations = mutations.len(), "compiled statement");
    Ok(Program {
        module,
        mutations,
        lines,
    })
}

/// Parser state.
pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    lines: &'a LineMap,
    /// Enclosing loops within the innermost function.
    loop_depth: u32,
    function_depth: u32,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: &'a [Token], lines: &'a LineMap) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            lines,
            loop_depth: 0,
            function_depth: 0,
        }
    }

    #[inline]
    fn current_tok(&self) -> &'a Tok {
        self.cursor.current_tok()
    }

    #[inline]
    fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    #[inline]
    fn previous_span(&self) -> Span {
        self.cursor.previous_span()
    }

    /// Span from `start` to the end of the last consumed token.
    #[inline]
    fn span_from(&self, start: Span) -> Span {
        Span::new(start.start, self.previous_span().end.max(start.start))
    }

    #[cold]
    fn error_at(&self, message: &str, span: Span) -> CompileError {
        let (line, col) = self.lines.line_col(span.start);
        SyntaxError::new(message, line, col).into()
    }

    /// Error for an unexpected current token.
    #[cold]
    fn unexpected(&self) -> CompileError {
        let message = match self.current_tok() {
            Tok::Indent => "unexpected indent",
            Tok::Dedent => "unindent does not match any outer indentation level",
            Tok::EndMarker => "unexpected EOF while parsing",
            _ => "invalid syntax",
        };
        self.error_at(message, self.current_span())
    }

    #[cold]
    fn unsupported(&self, message: &str, span: Span) -> CompileError {
        let line = self.lines.line(span.start);
        UnsupportedConstructError::new(message, line).into()
    }

    fn expect_op(&mut self, op: cooker::Op) -> ParseResult<Span> {
        if self.cursor.check_op(op) {
            Ok(self.cursor.advance().span)
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_keyword(&mut self, kw: &str) -> ParseResult<Span> {
        if self.cursor.check_keyword(kw) {
            Ok(self.cursor.advance().span)
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_name(&mut self) -> ParseResult<String> {
        match self.current_tok() {
            Tok::Name(name) => {
                self.cursor.advance();
                Ok(name.clone())
            }
            _ => Err(self.unexpected()),
        }
    }
}

#[cfg(test)]
mod tests;
