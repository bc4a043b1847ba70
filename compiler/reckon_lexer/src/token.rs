//! Token kinds and flags.

use bitflags::bitflags;

/// Kind of a line token.
///
/// Each bracket and the backquote get their own kind so pairing checks are a
/// single comparison.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Name,
    /// `None`, `True`, `False`.
    BuiltinConstant,
    /// Operators and delimiters without a dedicated kind.
    Punctuation,
    Comment,
    String,
    /// A trailing `\` joining the next line.
    Continuation,
    Number,
    /// Unrecognized or mismatched text.
    Junk,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Backquote,
    Colon,
    Dot,
    Equal,
    /// `+=`, `<<=` and the other augmented assignments.
    AugEqual,
}

bitflags! {
    /// Stack effects of a token.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u8 {
        /// Pushed a delimiter onto the lexical stack.
        const OPEN = 1 << 0;
        /// Popped the matching delimiter off the lexical stack.
        const CLOSE = 1 << 1;
    }
}

/// A token within one line: `[start, end)` byte offsets into the line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub flags: TokenFlags,
}

impl Token {
    #[inline]
    pub const fn new(kind: TokenKind, start: usize, end: usize, flags: TokenFlags) -> Self {
        Token {
            kind,
            start,
            end,
            flags,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.flags.contains(TokenFlags::OPEN)
    }

    #[inline]
    pub fn is_close(&self) -> bool {
        self.flags.contains(TokenFlags::CLOSE)
    }

    /// Whether `col` falls inside the token.
    #[inline]
    pub fn contains(&self, col: usize) -> bool {
        self.start <= col && col < self.end
    }

    /// Text of the token within `line`.
    #[inline]
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        line.get(self.start..self.end).unwrap_or("")
    }

    /// Kinds that can be part of a dotted name path.
    #[inline]
    pub fn is_name_like(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Name | TokenKind::Keyword | TokenKind::BuiltinConstant
        )
    }
}
