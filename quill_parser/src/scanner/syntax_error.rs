use crate::token::StreamError;
use thiserror::Error;

/// Lexical failure at a known position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at {line}:{col} (offset {offset}): {message}")]
pub struct SyntaxError {
    /// Byte offset.
    pub offset: usize,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub col: usize,
    /// Diagnostic text.
    pub message: String,
}

/// Condition that stops the scanner loop.
///
/// A [`ScanFault::Syntax`] is converted into an `Error` token by the loop;
/// every other variant aborts the scan and is handed back to the caller.
#[derive(Debug, Error)]
pub enum ScanFault {
    /// Recoverable lexical failure, e.g. reading past the end of input.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// No state accepts the character at the current position.
    #[error("no scanner state accepts {rune:?} at {line}:{col} (offset {offset})")]
    UnexpectedRune {
        /// The offending character.
        rune: char,
        /// Byte offset.
        offset: usize,
        /// 1-based line.
        line: usize,
        /// 1-based column.
        col: usize,
    },
    /// The token stream rejected an operation.
    #[error("token stream: {0}")]
    Stream(#[from] StreamError),
    /// The scanner thread panicked.
    #[error("scanner panicked: {0}")]
    Panicked(String),
}
