//! Compile errors.

use thiserror::Error;

/// Statement text does not parse.
///
/// `line` and `offset` are zero-based, relative to the statement's first
/// line; `offset` is a byte column.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub line: u32,
    pub offset: u32,
}

impl SyntaxError {
    #[cold]
    pub fn new(message: impl Into<String>, line: u32, offset: u32) -> Self {
        SyntaxError {
            message: message.into(),
            line,
            offset,
        }
    }

    #[cold]
    pub fn invalid_syntax(line: u32, offset: u32) -> Self {
        Self::new("invalid syntax", line, offset)
    }
}

/// Statement text parses but uses a construct a worksheet cannot run
/// safely.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UnsupportedConstructError {
    pub message: String,
    pub line: u32,
}

impl UnsupportedConstructError {
    #[cold]
    pub fn new(message: impl Into<String>, line: u32) -> Self {
        UnsupportedConstructError {
            message: message.into(),
            line,
        }
    }
}

/// Why a statement could not be compiled.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("SyntaxError: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("UnsupportedSyntaxError: {0}")]
    Unsupported(#[from] UnsupportedConstructError),
}

impl CompileError {
    pub fn message(&self) -> &str {
        match self {
            CompileError::Syntax(e) => &e.message,
            CompileError::Unsupported(e) => &e.message,
        }
    }

    /// Zero-based line of the error within the statement.
    pub fn line(&self) -> u32 {
        match self {
            CompileError::Syntax(e) => e.line,
            CompileError::Unsupported(e) => e.line,
        }
    }

    /// Byte column, when known.
    pub fn offset(&self) -> Option<u32> {
        match self {
            CompileError::Syntax(e) => Some(e.offset),
            CompileError::Unsupported(_) => None,
        }
    }
}
