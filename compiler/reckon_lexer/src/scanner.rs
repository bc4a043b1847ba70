//! Single-line scanner.
//!
//! [`tokenize_line`] walks one line byte by byte. The main dispatch picks a
//! focused method per leading byte; each method advances `pos` past one
//! token and records it. Malformed input is never an error: it is recorded
//! as [`TokenKind::Junk`] and scanning continues.
//!
//! # Stack discipline
//!
//! - `(`, `[`, `{` push; a closer pops only when it matches the innermost
//!   entry, otherwise it is junk and the stack is untouched.
//! - `` ` `` toggles.
//! - An unterminated string pushes its delimiter. At the end of the line a
//!   short (`'`/`"`) string is popped again unless the line ends with a
//!   `\` continuation, so a typo cannot turn the rest of the statement
//!   into one string.
//! - A line that starts with a string delimiter on the stack begins by
//!   scanning for the closing delimiter.

use crate::keywords::{is_builtin_constant, is_keyword};
use crate::number::is_valid_number;
use crate::stack::{Delimiter, LexStack};
use crate::token::{Token, TokenFlags, TokenKind};

/// Tokenize `line`, given the stack carried from the previous line.
///
/// Returns the tokens (whitespace is skipped) and the stack to carry into
/// the next line.
pub fn tokenize_line(line: &str, stack: &[Delimiter]) -> (Vec<Token>, LexStack) {
    let mut scanner = LineScanner::new(line, stack);
    scanner.run();
    scanner.finish()
}

struct LineScanner<'a> {
    line: &'a str,
    bytes: &'a [u8],
    pos: usize,
    stack: LexStack,
    tokens: Vec<Token>,
}

impl<'a> LineScanner<'a> {
    fn new(line: &'a str, stack: &[Delimiter]) -> Self {
        LineScanner {
            line,
            bytes: line.as_bytes(),
            pos: 0,
            stack: stack.iter().copied().collect(),
            tokens: Vec::new(),
        }
    }

    fn run(&mut self) {
        if let Some(&top) = self.stack.last() {
            if top.is_string() {
                self.resume_string(top);
            }
        }
        while self.pos < self.bytes.len() {
            self.next_token();
        }
    }

    fn finish(mut self) -> (Vec<Token>, LexStack) {
        let dangling_short_string = self
            .stack
            .last()
            .is_some_and(|d| d.is_short_string());
        let continued = self
            .tokens
            .last()
            .is_some_and(|t| t.kind == TokenKind::Continuation);
        if dangling_short_string && !continued {
            if let Some(last) = self.tokens.last_mut() {
                last.flags.remove(TokenFlags::OPEN);
            }
            self.stack.pop();
        }
        (self.tokens, self.stack)
    }

    #[inline]
    fn peek(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    #[inline]
    fn push(&mut self, kind: TokenKind, start: usize, flags: TokenFlags) {
        self.tokens.push(Token::new(kind, start, self.pos, flags));
    }

    fn next_token(&mut self) {
        let start = self.pos;
        match self.bytes[start] {
            b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C => self.whitespace(),
            b'#' => self.comment(start),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(start),
            b'\'' | b'"' => self.string(start, start),
            b'\\' => {
                self.pos += 1;
                self.push(TokenKind::Continuation, start, TokenFlags::empty());
            }
            b'0'..=b'9' => self.number(start),
            b'.' if self.peek(1).is_ascii_digit() => self.number(start),
            b'.' => {
                self.pos += 1;
                self.push(TokenKind::Dot, start, TokenFlags::empty());
            }
            b'@' | b',' | b';' | b'~' => self.single(start, TokenKind::Punctuation),
            b':' => self.single(start, TokenKind::Colon),
            b'(' => self.open(start, Delimiter::Paren, TokenKind::LParen),
            b'[' => self.open(start, Delimiter::Bracket, TokenKind::LBracket),
            b'{' => self.open(start, Delimiter::Brace, TokenKind::LBrace),
            b')' => self.close(start, Delimiter::Paren, TokenKind::RParen),
            b']' => self.close(start, Delimiter::Bracket, TokenKind::RBracket),
            b'}' => self.close(start, Delimiter::Brace, TokenKind::RBrace),
            b'`' => self.backquote(start),
            b'+' | b'-' | b'%' | b'&' | b'|' | b'^' => self.operator(start, 1),
            b'*' | b'/' => self.doubled_operator(start),
            b'<' | b'>' => self.shift_or_compare(start),
            b'=' => {
                if self.peek(1) == b'=' {
                    self.pos += 2;
                    self.push(TokenKind::Punctuation, start, TokenFlags::empty());
                } else {
                    self.single(start, TokenKind::Equal);
                }
            }
            b'!' if self.peek(1) == b'=' => {
                self.pos += 2;
                self.push(TokenKind::Punctuation, start, TokenFlags::empty());
            }
            b if is_not_valid(b) => self.junk_run(start),
            // Remaining printable ASCII that starts no token (`!`).
            _ => self.single(start, TokenKind::Junk),
        }
    }

    fn whitespace(&mut self) {
        while matches!(self.peek(0), b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C) {
            self.pos += 1;
        }
    }

    fn comment(&mut self, start: usize) {
        self.pos = self.bytes.len();
        self.push(TokenKind::Comment, start, TokenFlags::empty());
    }

    fn single(&mut self, start: usize, kind: TokenKind) {
        self.pos += 1;
        self.push(kind, start, TokenFlags::empty());
    }

    fn identifier(&mut self, start: usize) {
        while matches!(self.peek(0), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.pos += 1;
        }
        let word = &self.line[start..self.pos];
        if is_string_prefix(word) && matches!(self.peek(0), b'\'' | b'"') {
            let quote_at = self.pos;
            self.string(start, quote_at);
            return;
        }
        let kind = if is_keyword(word) {
            TokenKind::Keyword
        } else if is_builtin_constant(word) {
            TokenKind::BuiltinConstant
        } else {
            TokenKind::Name
        };
        self.push(kind, start, TokenFlags::empty());
    }

    /// String literal whose (optional) prefix starts at `start` and whose
    /// opening quote is at `quote_at`.
    fn string(&mut self, start: usize, quote_at: usize) {
        let quote = self.bytes[quote_at];
        let triple = self.bytes[quote_at..].starts_with(&[quote, quote, quote]);
        let delim = match (quote, triple) {
            (b'\'', true) => Delimiter::TripleSingle,
            (b'\'', false) => Delimiter::Single,
            (_, true) => Delimiter::TripleDouble,
            (_, false) => Delimiter::Double,
        };
        let body = quote_at + if triple { 3 } else { 1 };
        let (end, closed) = self.scan_string_body(body, delim);
        self.pos = end;
        if closed {
            self.push(TokenKind::String, start, TokenFlags::empty());
        } else {
            self.stack.push(delim);
            self.push(TokenKind::String, start, TokenFlags::OPEN);
        }
    }

    /// Continue a string carried over from the previous line.
    fn resume_string(&mut self, delim: Delimiter) {
        let (end, closed) = self.scan_string_body(0, delim);
        self.pos = end;
        let flags = if closed {
            self.stack.pop();
            TokenFlags::CLOSE
        } else {
            TokenFlags::empty()
        };
        self.push(TokenKind::String, 0, flags);
    }

    /// Scan string contents from `from`. Returns the end of the string
    /// token and whether the closing delimiter was found. A backslash at
    /// the very end of the line is left for the continuation token.
    fn scan_string_body(&self, from: usize, delim: Delimiter) -> (usize, bool) {
        let quote = delim.quote();
        let len = self.bytes.len();
        let mut i = from;
        while i < len {
            let b = self.bytes[i];
            if b == b'\\' {
                if i + 1 >= len {
                    return (i, false);
                }
                let escaped = self.line[i + 1..].chars().next().map_or(1, char::len_utf8);
                i += 1 + escaped;
                continue;
            }
            if b == quote {
                if !delim.is_triple() {
                    return (i + 1, true);
                }
                if self.bytes[i..].starts_with(&[quote, quote, quote]) {
                    return (i + 3, true);
                }
            }
            i += 1;
        }
        (len, false)
    }

    fn number(&mut self, start: usize) {
        if self.bytes[start] == b'0' && matches!(self.peek(1), b'x' | b'X') {
            self.pos += 2;
            self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        } else {
            self.pos += if self.bytes[start] == b'.' { 2 } else { 1 };
            self.eat_while(|b| b.is_ascii_digit() || b == b'.');
            if matches!(self.peek(0), b'e' | b'E') {
                self.pos += 1;
                if matches!(self.peek(0), b'+' | b'-') {
                    self.pos += 1;
                }
            }
            self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.');
        }
        let kind = if is_valid_number(&self.line[start..self.pos]) {
            TokenKind::Number
        } else {
            TokenKind::Junk
        };
        self.push(kind, start, TokenFlags::empty());
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.pos < self.bytes.len() && pred(self.bytes[self.pos]) {
            self.pos += 1;
        }
    }

    fn open(&mut self, start: usize, delim: Delimiter, kind: TokenKind) {
        self.pos += 1;
        self.stack.push(delim);
        self.push(kind, start, TokenFlags::OPEN);
    }

    fn close(&mut self, start: usize, delim: Delimiter, kind: TokenKind) {
        self.pos += 1;
        if self.stack.last() == Some(&delim) {
            self.stack.pop();
            self.push(kind, start, TokenFlags::CLOSE);
        } else {
            self.push(TokenKind::Junk, start, TokenFlags::empty());
        }
    }

    fn backquote(&mut self, start: usize) {
        self.pos += 1;
        if self.stack.last() == Some(&Delimiter::Backquote) {
            self.stack.pop();
            self.push(TokenKind::Backquote, start, TokenFlags::CLOSE);
        } else {
            self.stack.push(Delimiter::Backquote);
            self.push(TokenKind::Backquote, start, TokenFlags::OPEN);
        }
    }

    /// Operator of `len` bytes, optionally followed by `=`.
    fn operator(&mut self, start: usize, len: usize) {
        self.pos += len;
        if self.peek(0) == b'=' {
            self.pos += 1;
            self.push(TokenKind::AugEqual, start, TokenFlags::empty());
        } else {
            self.push(TokenKind::Punctuation, start, TokenFlags::empty());
        }
    }

    /// `*`, `**`, `/`, `//` and their augmented forms.
    fn doubled_operator(&mut self, start: usize) {
        let len = if self.peek(1) == self.bytes[start] { 2 } else { 1 };
        self.operator(start, len);
    }

    /// `<`, `<<`, `<=`, `<>`, `<<=` and the `>` family.
    fn shift_or_compare(&mut self, start: usize) {
        let first = self.bytes[start];
        let second = self.peek(1);
        if second == first {
            self.operator(start, 2);
            return;
        }
        let len = if second == b'=' || (first == b'<' && second == b'>') {
            2
        } else {
            1
        };
        self.pos += len;
        self.push(TokenKind::Punctuation, start, TokenFlags::empty());
    }

    fn junk_run(&mut self, start: usize) {
        self.eat_while(is_not_valid);
        self.push(TokenKind::Junk, start, TokenFlags::empty());
    }
}

/// Bytes that cannot appear outside a string: control bytes, `$`, `?`,
/// DEL and all non-ASCII bytes. Runs of them become one junk token, which
/// keeps multi-byte characters whole.
#[inline]
fn is_not_valid(b: u8) -> bool {
    match b {
        b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C => false,
        0x21..=0x23 | 0x25..=0x3E | 0x40..=0x7E => false,
        _ => true,
    }
}

fn is_string_prefix(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "r" | "u" | "ur" | "ru"
    )
}

#[cfg(test)]
mod tests;
