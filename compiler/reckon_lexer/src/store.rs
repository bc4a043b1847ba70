//! Per-statement token cache.
//!
//! A [`StatementTokenStore`] keeps the lines of one statement with their
//! tokens and the lexical stack after each line. Replacing the lines
//! re-lexes only what changed: the unchanged prefix and suffix are reused,
//! and re-lexing stops as soon as it reaches the unchanged suffix with the
//! same stack it had before, because every later line would lex the same.
//!
//! The store also answers cursor queries for editors: matching bracket,
//! indentation of the next line, and the dotted name path at a position.

use std::ops::Range;

use tracing::trace;

use crate::keywords::is_keyword_prefix;
use crate::scanner::tokenize_line;
use crate::stack::LexStack;
use crate::token::{Token, TokenKind};

/// Keywords after which the next word is a new binding, not a reference.
const NO_COMPLETION_KEYWORDS: &[&str] = &[
    "as", "class", "def", "for", "from", "global", "import", "lambda", "nonlocal",
];

/// Position of a token: line within the statement and index in that line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct TokenPos {
    line: usize,
    index: usize,
}

/// What the completer should offer at a cursor position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionQuery {
    /// Completion makes no sense here.
    Nothing,
    /// Names visible in scope starting with `prefix`.
    Scope { prefix: String },
    /// Attributes of the object reached through `base` starting with
    /// `prefix`.
    Attribute { base: Vec<String>, prefix: String },
}

/// Dotted name chain ending at a cursor position, e.g. `a.b.c`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamePath {
    pub names: Vec<String>,
    /// Line of the last name.
    pub line: usize,
    /// Byte range of the last name within its line.
    pub start: usize,
    pub end: usize,
    /// The name is followed by an assignment, so it refers to the value
    /// the statement produces.
    pub assigned: bool,
}

#[derive(Clone, Debug, Default)]
pub struct StatementTokenStore {
    lines: Vec<String>,
    tokens: Vec<Vec<Token>>,
    stacks: Vec<LexStack>,
}

impl StatementTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the statement's lines.
    ///
    /// Returns `None` when nothing changed. Otherwise returns the range of
    /// lines whose tokens were recomputed; an empty range means lines were
    /// only removed.
    pub fn set_lines(&mut self, lines: Vec<String>) -> Option<Range<usize>> {
        let old_lines = std::mem::take(&mut self.lines);
        let mut old_tokens = std::mem::take(&mut self.tokens);
        let old_stacks = std::mem::take(&mut self.stacks);

        let n = lines.len();
        let old_n = old_lines.len();

        let shared = n.min(old_n);
        let prefix = (0..shared)
            .take_while(|&i| lines[i] == old_lines[i])
            .count();
        if prefix == n && prefix == old_n {
            self.lines = old_lines;
            self.tokens = old_tokens;
            self.stacks = old_stacks;
            return None;
        }

        let suffix = (0..(n - prefix).min(old_n - prefix))
            .take_while(|&j| lines[n - 1 - j] == old_lines[old_n - 1 - j])
            .count();
        let new_suffix_start = n - suffix;
        let old_suffix_start = old_n - suffix;

        let mut tokens = vec![Vec::new(); n];
        let mut stacks = vec![LexStack::new(); n];
        for i in 0..prefix {
            tokens[i] = std::mem::take(&mut old_tokens[i]);
            stacks[i] = old_stacks[i].clone();
        }
        for k in 0..suffix {
            tokens[new_suffix_start + k] = std::mem::take(&mut old_tokens[old_suffix_start + k]);
            stacks[new_suffix_start + k] = old_stacks[old_suffix_start + k].clone();
        }

        let mut stack = if prefix > 0 {
            stacks[prefix - 1].clone()
        } else {
            LexStack::new()
        };
        let mut changed: Option<Range<usize>> = None;
        let mut i = prefix;
        while i < n {
            if i >= new_suffix_start {
                let old_i = old_suffix_start + (i - new_suffix_start);
                let old_stack_before = if old_i == 0 {
                    LexStack::new()
                } else {
                    old_stacks[old_i - 1].clone()
                };
                if stack == old_stack_before {
                    break;
                }
            }
            let (line_tokens, next) = tokenize_line(&lines[i], &stack);
            tokens[i] = line_tokens;
            stacks[i] = next.clone();
            stack = next;
            changed = Some(changed.map_or(i..i + 1, |r| r.start..i + 1));
            i += 1;
        }

        self.lines = lines;
        self.tokens = tokens;
        self.stacks = stacks;

        let changed = changed.unwrap_or(prefix..prefix);
        trace!(?changed, lines = n, "statement retokenized");
        Some(changed)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn tokens(&self, line: usize) -> &[Token] {
        self.tokens.get(line).map_or(&[][..], Vec::as_slice)
    }

    /// Lexical stack at the end of `line`.
    pub fn stack_after(&self, line: usize) -> &[crate::Delimiter] {
        self.stacks.get(line).map_or(&[][..], |s| s.as_slice())
    }

    fn token(&self, pos: TokenPos) -> &Token {
        &self.tokens[pos.line][pos.index]
    }

    fn token_text(&self, pos: TokenPos) -> &str {
        self.token(pos).text(&self.lines[pos.line])
    }

    fn prev(&self, pos: TokenPos) -> Option<TokenPos> {
        if pos.index > 0 {
            return Some(TokenPos {
                line: pos.line,
                index: pos.index - 1,
            });
        }
        (0..pos.line)
            .rev()
            .find(|&l| !self.tokens[l].is_empty())
            .map(|line| TokenPos {
                line,
                index: self.tokens[line].len() - 1,
            })
    }

    fn next(&self, pos: TokenPos) -> Option<TokenPos> {
        if pos.index + 1 < self.tokens[pos.line].len() {
            return Some(TokenPos {
                line: pos.line,
                index: pos.index + 1,
            });
        }
        (pos.line + 1..self.tokens.len())
            .find(|&l| !self.tokens[l].is_empty())
            .map(|line| TokenPos { line, index: 0 })
    }

    /// Token containing byte `col` of `line`.
    fn token_at(&self, line: usize, col: usize) -> Option<TokenPos> {
        let tokens = self.tokens.get(line)?;
        for (index, tok) in tokens.iter().enumerate() {
            if tok.start > col {
                return None;
            }
            if tok.contains(col) {
                return Some(TokenPos { line, index });
            }
        }
        None
    }

    /// Last token that does not lie entirely after `col`, searching back
    /// into earlier lines when `col` is before the line's first token.
    fn token_before(&self, line: usize, col: usize) -> Option<TokenPos> {
        let tokens = self.tokens.get(line)?;
        match tokens.first() {
            Some(first) if col > first.start => {
                let index = tokens
                    .iter()
                    .position(|t| col <= t.start)
                    .map_or(tokens.len() - 1, |i| i - 1);
                Some(TokenPos { line, index })
            }
            _ => (0..line)
                .rev()
                .find(|&l| !self.tokens[l].is_empty())
                .map(|l| TokenPos {
                    line: l,
                    index: self.tokens[l].len() - 1,
                }),
        }
    }

    fn first_token(&self) -> Option<TokenPos> {
        (0..self.tokens.len())
            .find(|&l| !self.tokens[l].is_empty())
            .map(|line| TokenPos { line, index: 0 })
    }

    /// Location `(line, col)` of the bracket paired with the one at
    /// `(line, col)`. Strings are not paired.
    pub fn pair_location(&self, line: usize, col: usize) -> Option<(usize, usize)> {
        let mut pos = self.token_at(line, col)?;
        let tok = *self.token(pos);
        if tok.kind == TokenKind::String {
            return None;
        }
        let forward = if tok.is_close() {
            false
        } else if tok.is_open() {
            true
        } else {
            return None;
        };

        let mut level = 0i32;
        loop {
            let t = self.token(pos);
            if t.kind != TokenKind::String {
                if t.is_open() {
                    level += if forward { 1 } else { -1 };
                } else if t.is_close() {
                    level += if forward { -1 } else { 1 };
                }
            }
            if level == 0 {
                return Some((pos.line, t.start));
            }
            pos = if forward {
                self.next(pos)?
            } else {
                self.prev(pos)?
            };
        }
    }

    /// Indentation for a new line typed after `line`.
    ///
    /// The base is the indentation of the first physical line of the
    /// logical line containing `line`; four spaces are added after a
    /// trailing `:`, inside an open bracket, or after a `\`.
    pub fn next_line_indent(&self, line: usize) -> String {
        if line >= self.lines.len() {
            return String::new();
        }
        let mut base = line;
        while base > 0 {
            let prev = base - 1;
            let open = !self.stacks[prev].is_empty();
            let continued = self.tokens[prev]
                .last()
                .is_some_and(|t| t.kind == TokenKind::Continuation);
            if !open && !continued {
                break;
            }
            base = prev;
        }

        let base_line = &self.lines[base];
        let mut indent: String = base_line
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();

        let tokens = &self.tokens[line];
        let last = tokens.last().map(|t| t.kind);
        let before_last = tokens.len().checked_sub(2).map(|i| tokens[i].kind);
        let opens_block = last == Some(TokenKind::Colon)
            || (last == Some(TokenKind::Comment) && before_last == Some(TokenKind::Colon));
        if opens_block
            || !self.stacks[line].is_empty()
            || last == Some(TokenKind::Continuation)
        {
            indent.push_str("    ");
        }
        indent
    }

    /// Whether the statement is an `import` or `from` statement.
    pub fn is_import(&self) -> bool {
        let mut pos = self.first_token();
        while let Some(p) = pos {
            if self.token(p).kind != TokenKind::Continuation {
                break;
            }
            pos = self.next(p);
        }
        pos.is_some_and(|p| {
            self.token(p).kind == TokenKind::Keyword
                && matches!(self.token_text(p), "import" | "from")
        })
    }

    fn no_completion_after(&self, pos: TokenPos) -> bool {
        let tok = self.token(pos);
        match tok.kind {
            TokenKind::Keyword => NO_COMPLETION_KEYWORDS.contains(&self.token_text(pos)),
            TokenKind::Name
            | TokenKind::String
            | TokenKind::Number
            | TokenKind::Junk
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::BuiltinConstant => true,
            _ => false,
        }
    }

    /// Decide what to complete at `(line, col)`.
    ///
    /// `min_length > 0` selects spontaneous mode (completion the user did
    /// not ask for): a lone name must be at least that long and must not
    /// look like the start of a keyword.
    pub fn completion_query(&self, line: usize, col: usize, min_length: usize) -> CompletionQuery {
        if self.is_import() {
            return CompletionQuery::Nothing;
        }

        let at = col
            .checked_sub(1)
            .and_then(|c| self.token_at(line, c))
            .filter(|p| self.token(*p).is_name_like());

        let mut names: Vec<String>;
        let mut cur: Option<TokenPos>;
        if let Some(p) = at {
            let tok = self.token(p);
            let end = tok.end.min(col);
            names = vec![self.lines[p.line][tok.start..end].to_owned()];
            cur = self.prev(p);
        } else {
            let before = self.token_before(line, col);
            match before.map(|p| (p, self.token(p).kind)) {
                Some((p, TokenKind::Dot)) => {
                    names = vec![String::new()];
                    cur = Some(p);
                }
                _ if min_length > 0 => return CompletionQuery::Nothing,
                Some((
                    _,
                    TokenKind::Name
                    | TokenKind::BuiltinConstant
                    | TokenKind::RParen
                    | TokenKind::RBracket
                    | TokenKind::RBrace
                    | TokenKind::String
                    | TokenKind::Number,
                )) => return CompletionQuery::Nothing,
                Some((p, _)) if self.no_completion_after(p) => return CompletionQuery::Nothing,
                _ => {
                    return CompletionQuery::Scope {
                        prefix: String::new(),
                    }
                }
            }
        }

        while let Some(dot) = cur.filter(|p| self.token(*p).kind == TokenKind::Dot) {
            let Some(p) = self.prev(dot) else {
                return CompletionQuery::Nothing;
            };
            if !matches!(
                self.token(p).kind,
                TokenKind::Name | TokenKind::BuiltinConstant
            ) {
                return CompletionQuery::Nothing;
            }
            names.insert(0, self.token_text(p).to_owned());
            cur = self.prev(p);
        }

        if cur.is_some_and(|p| self.no_completion_after(p)) {
            return CompletionQuery::Nothing;
        }

        let prefix = names.pop().unwrap_or_default();
        if !names.is_empty() {
            return CompletionQuery::Attribute {
                base: names,
                prefix,
            };
        }
        if prefix.len() < min_length || (min_length > 0 && is_keyword_prefix(&prefix)) {
            return CompletionQuery::Nothing;
        }
        CompletionQuery::Scope { prefix }
    }

    /// The dotted name chain whose last name is at `(line, col)`.
    ///
    /// With `include_adjacent`, `col` is a position between characters and
    /// a name ending right before it also counts.
    pub fn name_path_at(&self, line: usize, col: usize, include_adjacent: bool) -> Option<NamePath> {
        if self.is_import() {
            return None;
        }
        let name_like = |p: &TokenPos| self.token(*p).is_name_like();
        let mut pos = self.token_at(line, col).filter(name_like);
        if pos.is_none() && include_adjacent && col > 0 {
            pos = self.token_at(line, col - 1).filter(name_like);
        }
        let pos = pos?;
        let tok = *self.token(pos);

        let mut names = vec![self.token_text(pos).to_owned()];
        let mut cur = self.prev(pos);
        while let Some(dot) = cur.filter(|p| self.token(*p).kind == TokenKind::Dot) {
            let p = self.prev(dot)?;
            if !matches!(
                self.token(p).kind,
                TokenKind::Name | TokenKind::BuiltinConstant
            ) {
                return None;
            }
            names.insert(0, self.token_text(p).to_owned());
            cur = self.prev(p);
        }

        let mut assigned = false;
        let mut after = self.next(pos);
        while let Some(p) = after {
            if matches!(self.token(p).kind, TokenKind::Equal | TokenKind::AugEqual) {
                assigned = true;
                break;
            }
            after = self.next(p);
        }

        Some(NamePath {
            names,
            line: pos.line,
            start: tok.start,
            end: tok.end,
            assigned,
        })
    }
}
