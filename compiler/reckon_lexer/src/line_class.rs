//! Coarse line shapes used to segment a worksheet into statements.

/// Shape of a source line, decided from its text alone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LineClass {
    /// Only whitespace.
    Blank,
    /// First non-whitespace character is `#`.
    Comment,
    /// Indented, or starts with `else`/`elif`/`except`/`finally`: belongs
    /// to the statement above.
    Continuation,
    /// Anything else starts a new statement.
    StatementStart,
}

impl LineClass {
    /// Blank and comment lines never start or end a statement by
    /// themselves.
    pub fn is_filler(self) -> bool {
        matches!(self, LineClass::Blank | LineClass::Comment)
    }
}

const CONTINUATION_KEYWORDS: &[&str] = &["else", "elif", "except", "finally"];

pub fn classify_line(line: &str) -> LineClass {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return LineClass::Blank;
    }
    if trimmed.starts_with('#') {
        return LineClass::Comment;
    }
    if trimmed.len() != line.len() {
        return LineClass::Continuation;
    }
    let starts_clause = CONTINUATION_KEYWORDS.iter().any(|kw| {
        line.strip_prefix(kw)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_'))
    });
    if starts_clause {
        LineClass::Continuation
    } else {
        LineClass::StatementStart
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_lines() {
        assert_eq!(classify_line(""), LineClass::Blank);
        assert_eq!(classify_line("   \t"), LineClass::Blank);
        assert_eq!(classify_line("# hi"), LineClass::Comment);
        assert_eq!(classify_line("    # indented"), LineClass::Comment);
        assert_eq!(classify_line("    x"), LineClass::Continuation);
        assert_eq!(classify_line("else:"), LineClass::Continuation);
        assert_eq!(classify_line("elif x:"), LineClass::Continuation);
        assert_eq!(classify_line("finally"), LineClass::Continuation);
        assert_eq!(classify_line("elsewhere = 1"), LineClass::StatementStart);
        assert_eq!(classify_line("x = 1"), LineClass::StatementStart);
    }
}
