use super::*;
use pretty_assertions::assert_eq;
use TokenKind::*;

fn lex_with<'a>(line: &'a str, stack: &[Delimiter]) -> (Vec<(TokenKind, &'a str)>, LexStack) {
    let (tokens, out) = tokenize_line(line, stack);
    let pairs = tokens.iter().map(|t| (t.kind, t.text(line))).collect();
    (pairs, out)
}

fn lex(line: &str) -> Vec<(TokenKind, &str)> {
    let (pairs, stack) = lex_with(line, &[]);
    assert!(stack.is_empty(), "unexpected stack {stack:?} for {line:?}");
    pairs
}

fn stack_of(delims: &[Delimiter]) -> LexStack {
    delims.iter().copied().collect()
}

#[test]
fn punctuation() {
    assert_eq!(lex("@"), vec![(Punctuation, "@")]);
    assert_eq!(lex("<<"), vec![(Punctuation, "<<")]);
    assert_eq!(lex("<<="), vec![(AugEqual, "<<=")]);
    assert_eq!(lex("<<>"), vec![(Punctuation, "<<"), (Punctuation, ">")]);
    assert_eq!(lex("**= //"), vec![(AugEqual, "**="), (Punctuation, "//")]);
    assert_eq!(lex("a == b"), vec![(Name, "a"), (Punctuation, "=="), (Name, "b")]);
    assert_eq!(lex("a = b"), vec![(Name, "a"), (Equal, "="), (Name, "b")]);
    assert_eq!(lex("x != y"), vec![(Name, "x"), (Punctuation, "!="), (Name, "y")]);
    assert_eq!(lex("!"), vec![(Junk, "!")]);
}

#[test]
fn open_bracket_is_carried() {
    let (pairs, stack) = lex_with("(", &[]);
    assert_eq!(pairs, vec![(LParen, "(")]);
    assert_eq!(stack, stack_of(&[Delimiter::Paren]));
}

#[test]
fn comments_names_keywords() {
    assert_eq!(lex("#foo"), vec![(Comment, "#foo")]);
    assert_eq!(lex("1 #foo"), vec![(Number, "1"), (Comment, "#foo")]);
    assert_eq!(lex("abc"), vec![(Name, "abc")]);
    assert_eq!(lex("if"), vec![(Keyword, "if")]);
    assert_eq!(lex("None"), vec![(BuiltinConstant, "None")]);
}

#[test]
fn strings() {
    assert_eq!(lex("'abc'"), vec![(String, "'abc'")]);
    assert_eq!(lex(r"'a\'bc'"), vec![(String, r"'a\'bc'")]);
    assert_eq!(lex("r'a' u\"b\""), vec![(String, "r'a'"), (String, "u\"b\"")]);
}

#[test]
fn unterminated_short_string_is_not_carried() {
    assert_eq!(lex("'abc"), vec![(String, "'abc")]);
    assert_eq!(lex("\""), vec![(String, "\"")]);
    assert_eq!(lex(r#""abc\""#), vec![(String, r#""abc\""#)]);

    let (tokens, _) = tokenize_line("'abc", &[]);
    assert!(!tokens[0].is_open());
}

#[test]
fn short_string_continued_with_backslash_is_carried() {
    let (pairs, stack) = lex_with("'abc\\", &[]);
    assert_eq!(pairs, vec![(String, "'abc"), (Continuation, "\\")]);
    assert_eq!(stack, stack_of(&[Delimiter::Single]));
}

#[test]
fn triple_quoted_strings_are_carried() {
    let (pairs, stack) = lex_with("\"\"\"foo\"", &[]);
    assert_eq!(pairs, vec![(String, "\"\"\"foo\"")]);
    assert_eq!(stack, stack_of(&[Delimiter::TripleDouble]));

    let (pairs, stack) = lex_with("'''foo'", &[]);
    assert_eq!(pairs, vec![(String, "'''foo'")]);
    assert_eq!(stack, stack_of(&[Delimiter::TripleSingle]));

    let (pairs, stack) = lex_with("\"\"\"foo\"\"\" \"\"\"bar", &[]);
    assert_eq!(pairs, vec![(String, "\"\"\"foo\"\"\""), (String, "\"\"\"bar")]);
    assert_eq!(stack, stack_of(&[Delimiter::TripleDouble]));
}

#[test]
fn numbers() {
    assert_eq!(lex("0x0"), vec![(Number, "0x0")]);
    assert_eq!(lex("1"), vec![(Number, "1")]);
    assert_eq!(lex("1.e3"), vec![(Number, "1.e3")]);
    assert_eq!(lex(".1e3"), vec![(Number, ".1e3")]);
    assert_eq!(lex("1.1e3"), vec![(Number, "1.1e3")]);
    assert_eq!(lex("1.1e+3"), vec![(Number, "1.1e+3")]);
    assert_eq!(
        lex("1.1e0+3"),
        vec![(Number, "1.1e0"), (Punctuation, "+"), (Number, "3")]
    );
    assert_eq!(lex("1a"), vec![(Junk, "1a")]);
}

#[test]
fn dots() {
    assert_eq!(lex("."), vec![(Dot, ".")]);
    assert_eq!(lex("a.b"), vec![(Name, "a"), (Dot, "."), (Name, "b")]);
}

#[test]
fn non_ascii_is_one_junk_token() {
    assert_eq!(lex("\u{e4}"), vec![(Junk, "\u{e4}")]);
    assert_eq!(lex("\u{e4}foo"), vec![(Junk, "\u{e4}"), (Name, "foo")]);
    assert_eq!(lex("$?"), vec![(Junk, "$?")]);
}

#[test]
fn bracket_matching() {
    assert_eq!(lex("()"), vec![(LParen, "("), (RParen, ")")]);
    assert_eq!(lex("}"), vec![(Junk, "}")]);
    assert_eq!(lex("(})"), vec![(LParen, "("), (Junk, "}"), (RParen, ")")]);
    assert_eq!(lex("``"), vec![(Backquote, "`"), (Backquote, "`")]);

    let (pairs, stack) = lex_with("`", &[]);
    assert_eq!(pairs, vec![(Backquote, "`")]);
    assert_eq!(stack, stack_of(&[Delimiter::Backquote]));
}

#[test]
fn mismatched_closer_leaves_stack_alone() {
    let (pairs, stack) = lex_with("]", &[Delimiter::Paren]);
    assert_eq!(pairs, vec![(Junk, "]")]);
    assert_eq!(stack, stack_of(&[Delimiter::Paren]));
}

#[test]
fn resuming_a_carried_string() {
    let dq = [Delimiter::Double];
    assert_eq!(lex_with("\"", &dq).0, vec![(String, "\"")]);
    assert_eq!(lex_with("\\\"", &dq), (vec![(String, "\\\"")], stack_of(&[])));
    assert_eq!(
        lex_with("\\\"\" 1", &dq).0,
        vec![(String, "\\\"\""), (Number, "1")]
    );
    assert_eq!(lex_with("'", &[Delimiter::Single]).0, vec![(String, "'")]);

    let tdq = [Delimiter::TripleDouble];
    assert_eq!(lex_with("foo\"\"\"", &tdq), (vec![(String, "foo\"\"\"")], stack_of(&[])));
    assert_eq!(lex_with("foo", &tdq), (vec![(String, "foo")], stack_of(&tdq)));
    assert_eq!(lex_with("foo\"", &tdq), (vec![(String, "foo\"")], stack_of(&tdq)));

    let tsq = [Delimiter::TripleSingle];
    assert_eq!(lex_with("foo'''", &tsq), (vec![(String, "foo'''")], stack_of(&[])));
    assert_eq!(lex_with("foo'", &tsq), (vec![(String, "foo'")], stack_of(&tsq)));
}

#[test]
fn closing_a_carried_string_sets_close_flag() {
    let (tokens, stack) = tokenize_line("b'''", &[Delimiter::TripleSingle]);
    assert!(stack.is_empty());
    assert!(tokens[0].is_close());
}

#[test]
fn spans_are_byte_offsets() {
    let (tokens, _) = tokenize_line("  foo(1)", &[]);
    assert_eq!((tokens[0].start, tokens[0].end), (2, 5));
    assert_eq!((tokens[3].start, tokens[3].end), (7, 8));
}
