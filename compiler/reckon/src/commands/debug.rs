//! The `lex` command: show the tokens of every line.

use std::fmt::Write as _;

use reckon_lexer::{classify_line, tokenize_line, Delimiter, LexStack};

use super::read_file;

/// Lex a file and display the token stream.
pub fn lex_file(path: &str) {
    let content = read_file(path);
    print!("{}", render_tokens(&content));
}

/// Tokens per line, with each line's class and the delimiters still open
/// after it.
pub fn render_tokens(text: &str) -> String {
    let mut out = String::new();
    let mut stack = LexStack::new();
    for (number, line) in text.lines().enumerate() {
        let (tokens, next) = tokenize_line(line, &stack);
        let _ = writeln!(out, "{:>4} {:?}", number + 1, classify_line(line));
        for token in &tokens {
            let _ = writeln!(
                out,
                "       {:?} {}..{} {:?}",
                token.kind,
                token.start,
                token.end,
                token.text(line)
            );
        }
        if !next.is_empty() {
            let open: Vec<&str> = next.iter().copied().map(Delimiter::as_str).collect();
            let _ = writeln!(out, "       open: {}", open.join(" "));
        }
        stack = next;
    }
    out
}
