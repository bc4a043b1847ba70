//! Positions and line splitting.

use std::cmp::Ordering;
use std::fmt;

use memchr::memchr2;

/// A line and byte offset within it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub offset: usize,
}

impl Position {
    pub const fn new(line: usize, offset: usize) -> Self {
        Position { line, offset }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.line, self.offset).cmp(&(other.line, other.offset))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.offset)
    }
}

/// Put two positions in document order.
pub(crate) fn ordered(a: Position, b: Position) -> (Position, Position) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Split `text` on `\r\n`, `\n` and `\r`. Always yields at least one piece;
/// text ending in a newline yields a trailing empty piece.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    while let Some(i) = memchr2(b'\n', b'\r', &bytes[start..]) {
        let at = start + i;
        pieces.push(&text[start..at]);
        start = if bytes[at] == b'\r' && bytes.get(at + 1) == Some(&b'\n') {
            at + 2
        } else {
            at + 1
        };
    }
    pieces.push(&text[start..]);
    pieces
}

/// Whether text is a single character that is not whitespace; runs of
/// such insertions coalesce into one undo step.
pub(crate) fn is_word_char(text: &str) -> bool {
    let mut chars = text.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_all_newline_styles() {
        assert_eq!(split_lines("a"), vec!["a"]);
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb\rc\n"), vec!["a", "b", "c", ""]);
        assert_eq!(split_lines("\n\n"), vec!["", "", ""]);
    }

    #[test]
    fn positions_order() {
        let a = Position::new(1, 5);
        let b = Position::new(2, 0);
        assert!(a < b);
        assert_eq!(ordered(b, a), (a, b));
        assert_eq!(a.to_string(), "1:5");
    }

    #[test]
    fn word_chars() {
        assert!(is_word_char("x"));
        assert!(is_word_char("é"));
        assert!(!is_word_char(" "));
        assert!(!is_word_char("ab"));
        assert!(!is_word_char(""));
    }
}
