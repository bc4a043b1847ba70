//! Reserved words of the worksheet language.

/// Reserved words, sorted.
pub const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "exec", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal",
    "not", "or", "pass", "print", "raise", "return", "try", "while", "with", "yield",
];

/// Names lexed as [`TokenKind::BuiltinConstant`](crate::TokenKind::BuiltinConstant).
pub(crate) const BUILTIN_CONSTANTS: &[&str] = &["False", "None", "True"];

#[inline]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.binary_search(&word).is_ok()
}

#[inline]
pub(crate) fn is_builtin_constant(word: &str) -> bool {
    BUILTIN_CONSTANTS.contains(&word)
}

/// Whether `word` is a non-empty prefix of some keyword.
pub fn is_keyword_prefix(word: &str) -> bool {
    !word.is_empty() && KEYWORDS.iter().any(|k| k.starts_with(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_table_is_sorted() {
        let mut sorted = KEYWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, KEYWORDS);
    }

    #[test]
    fn lookups() {
        assert!(is_keyword("lambda"));
        assert!(!is_keyword("lambd"));
        assert!(is_keyword_prefix("lambd"));
        assert!(!is_keyword_prefix("x"));
        assert!(is_builtin_constant("None"));
    }
}
