//! Quill SQL front end.
//!
//! A state-machine [`scanner`] turns SQL text into [`Token`]s and pushes them
//! through a bounded [`token::TokenStream`]. The [`parser`] drains that
//! stream on the calling thread and builds an [`ast::Query`] whose every node
//! reports its position, length, type and value.
#![warn(missing_docs)]

pub mod ast;
pub mod config;
pub mod matcher;
pub mod parser;
pub mod scanner;
pub mod token;

pub use config::ParserConfig;
pub use parser::{parse, Diagnostic, DiagnosticKind, Error, Parser};
pub use scanner::scan_all;
pub use token::{Keyword, Token, TokenType};
