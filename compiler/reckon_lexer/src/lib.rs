//! Reckon lexer - incremental, error-tolerant line tokenizer.
//!
//! Worksheet text is tokenized one line at a time. Each call takes the
//! *lexical stack* left by the previous line (open brackets, backquotes and
//! unterminated multi-line strings) and returns the line's tokens plus the
//! stack to carry forward. Tokenizing never fails: text that cannot be
//! classified becomes [`TokenKind::Junk`].
//!
//! # Layers
//!
//! - [`tokenize_line`]: the stateless per-line scanner
//! - [`LineClass`] / [`classify_line`]: the coarse shape of a line that
//!   drives statement segmentation
//! - [`StatementTokenStore`]: the per-statement token cache that re-lexes
//!   only changed lines, plus cursor queries (bracket pairing, indentation,
//!   name paths for completion)

mod keywords;
mod line_class;
mod number;
mod scanner;
mod stack;
mod store;
mod token;

pub use keywords::{is_keyword, is_keyword_prefix, KEYWORDS};
pub use line_class::{classify_line, LineClass};
pub use number::is_valid_number;
pub use scanner::tokenize_line;
pub use stack::{Delimiter, LexStack};
pub use store::{CompletionQuery, NamePath, StatementTokenStore};
pub use token::{Token, TokenFlags, TokenKind};
