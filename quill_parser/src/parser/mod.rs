//! Parser entry point and error model.
//!
//! [`Parser::parse`] starts the scanner on its own thread, drains the token
//! stream into a buffer under a deadline, and builds the tree by recursive
//! descent over that buffer. Lexical and syntactic problems are collected as
//! [`Diagnostic`]s and reported together; internal faults are converted into
//! [`Error::Unrecoverable`] carrying every diagnostic collected so far.

mod isolate;
mod query;
mod table;
mod value;

use crate::ast::Query;
use crate::config::ParserConfig;
use crate::scanner::ScanFault;
use crate::token::StreamError;
use isolate::Isolate;
use serde::Serialize;
use std::fmt;
use std::ops::Deref;
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

/// Origin of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// Reported by the scanner as an `Error` token.
    Lexical,
    /// No production matched at the cursor.
    Syntactic,
}

/// A non-fatal problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Origin.
    pub kind: DiagnosticKind,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub col: usize,
    /// Byte offset.
    pub offset: usize,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.col, self.message)
    }
}

/// Diagnostics in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Deref for Diagnostics {
    type Target = [Diagnostic];

    fn deref(&self) -> &[Diagnostic] {
        &self.0
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{d}")?;
        }
        f.write_str("]")
    }
}

/// Internal invariant violation.
#[derive(Debug, Error)]
pub enum Fault {
    /// The scanner aborted.
    #[error(transparent)]
    Scanner(#[from] ScanFault),
    /// The input nests deeper than the configured maximum.
    #[error("nesting exceeds {0} levels")]
    DepthExceeded(usize),
    /// The token stream failed outside of the accumulation deadline.
    #[error("token stream: {0}")]
    Stream(#[from] StreamError),
    /// The scanner thread could not be started.
    #[error("spawn scanner thread: {0}")]
    Spawn(#[from] std::io::Error),
    /// Tree construction panicked.
    #[error("panic: {0}")]
    Panicked(String),
}

/// Parse failure.
#[derive(Debug, Error)]
pub enum Error {
    /// At least one lexical diagnostic. Syntactic diagnostics found in the
    /// same pass are included.
    #[error("Scanner error: {0}")]
    Scanner(Diagnostics),
    /// Only syntactic diagnostics.
    #[error("Parser error: {0}")]
    Parser(Diagnostics),
    /// The token stream did not drain before the deadline.
    #[error("accumulate tokens: Operation timed out ({}ms)", .0.as_millis())]
    Timeout(Duration),
    /// Internal fault, with every diagnostic collected before it.
    #[error("fatal error: Unrecoverable error: {fault} (other errors while parsing: {collected})")]
    Unrecoverable {
        /// The fault.
        fault: Fault,
        /// Diagnostics collected before the fault.
        collected: Diagnostics,
    },
}

impl Error {
    /// Every diagnostic carried by this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Error::Scanner(d) | Error::Parser(d) => d.0.as_slice(),
            Error::Unrecoverable { collected, .. } => collected.0.as_slice(),
            Error::Timeout(_) => &[],
        }
    }
}

/// Reusable parser.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Parser with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser with `config`.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse one SQL statement.
    #[instrument(level = "debug", skip(self, sql), fields(len = sql.len()))]
    pub fn parse(&self, sql: &str) -> Result<Query, Error> {
        Isolate::new(sql, &self.config).parse()
    }
}

/// Parse one SQL statement with the default configuration.
pub fn parse(sql: &str) -> Result<Query, Error> {
    Parser::new().parse(sql)
}

#[cfg(test)]
mod tests;
