//! The lexical stack carried from line to line.

use smallvec::SmallVec;

/// A construct left open at the end of a line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Delimiter {
    Paren,
    Bracket,
    Brace,
    Backquote,
    /// `'`
    Single,
    /// `"`
    Double,
    /// `'''`
    TripleSingle,
    /// `"""`
    TripleDouble,
}

impl Delimiter {
    /// Text of the opening delimiter.
    pub fn as_str(self) -> &'static str {
        match self {
            Delimiter::Paren => "(",
            Delimiter::Bracket => "[",
            Delimiter::Brace => "{",
            Delimiter::Backquote => "`",
            Delimiter::Single => "'",
            Delimiter::Double => "\"",
            Delimiter::TripleSingle => "'''",
            Delimiter::TripleDouble => "\"\"\"",
        }
    }

    /// String delimiters, as opposed to brackets.
    pub fn is_string(self) -> bool {
        matches!(
            self,
            Delimiter::Single | Delimiter::Double | Delimiter::TripleSingle | Delimiter::TripleDouble
        )
    }

    /// Single-line string delimiters.
    pub fn is_short_string(self) -> bool {
        matches!(self, Delimiter::Single | Delimiter::Double)
    }

    /// Quote byte of a string delimiter.
    pub(crate) fn quote(self) -> u8 {
        match self {
            Delimiter::Single | Delimiter::TripleSingle => b'\'',
            _ => b'"',
        }
    }

    pub(crate) fn is_triple(self) -> bool {
        matches!(self, Delimiter::TripleSingle | Delimiter::TripleDouble)
    }
}

/// Stack of open delimiters; innermost last. Rarely deeper than a few.
pub type LexStack = SmallVec<[Delimiter; 4]>;
