//! Token cursor for navigating the cooked token stream.

use reckon_ir::Span;

use crate::cooker::{Op, Tok, Token};

/// Position in a cooked token stream.
///
/// Invariant: the stream is non-empty and ends with [`Tok::EndMarker`];
/// the cursor never moves past it.
pub(crate) struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| &t.tok),
            Some(Tok::EndMarker)
        ));
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub(crate) fn current(&self) -> &'a Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    #[inline]
    pub(crate) fn current_tok(&self) -> &'a Tok {
        &self.current().tok
    }

    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.current().span
    }

    /// Token `n` places ahead; clamps to the end marker.
    #[inline]
    pub(crate) fn peek_tok(&self, n: usize) -> &'a Tok {
        let i = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[i].tok
    }

    #[inline]
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.current_tok(), Tok::EndMarker)
    }

    pub(crate) fn advance(&mut self) -> &'a Token {
        let tok = self.current();
        if !self.is_at_end() {
            self.pos += 1;
        }
        tok
    }

    #[inline]
    pub(crate) fn check_op(&self, op: Op) -> bool {
        matches!(self.current_tok(), Tok::Op(o) if *o == op)
    }

    #[inline]
    pub(crate) fn check_keyword(&self, kw: &str) -> bool {
        matches!(self.current_tok(), Tok::Keyword(k) if *k == kw)
    }

    #[inline]
    pub(crate) fn check(&self, tok: &Tok) -> bool {
        self.current_tok() == tok
    }

    /// Consume the operator if present.
    pub(crate) fn eat_op(&mut self, op: Op) -> bool {
        let hit = self.check_op(op);
        if hit {
            self.pos += 1;
        }
        hit
    }

    /// Consume the keyword if present.
    pub(crate) fn eat_keyword(&mut self, kw: &str) -> bool {
        let hit = self.check_keyword(kw);
        if hit {
            self.pos += 1;
        }
        hit
    }
}
