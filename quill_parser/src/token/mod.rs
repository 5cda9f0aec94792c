//! Lexical tokens produced by the scanner.

mod keyword;
mod stream;

pub use keyword::Keyword;
pub use stream::{MemoryStream, Stream, StreamError, TokenStream};

use serde::Serialize;
use std::fmt;

/// Token type catalog.
///
/// The discriminants are stable. Non-delimiter tokens occupy the range
/// `RegularIdentifier..=SqlLanguageIdentifier`, delimiter tokens the range
/// `CharacterStringLiteral..=RightMinusBrace`. `Unknown`, `Error` and `Eof`
/// are sentinels outside both ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[repr(u16)]
pub enum TokenType {
    /// Never produced by the scanner.
    Unknown = 0,
    /// Lexical error; the value carries the diagnostic.
    Error,
    /// End of input.
    Eof,

    /// Identifier that is not a reserved word.
    RegularIdentifier,
    /// Reserved word.
    KeyWord,
    /// `12`, `1.5`, `.5e-3`.
    UnsignedNumericLiteral,
    /// `N'…'`.
    NationalCharacterStringLiteral,
    /// `X'…'`.
    BinaryStringLiteral,
    /// `10K`, `2G`.
    LargeObjectLengthToken,
    /// `U&"…"`.
    UnicodeDelimitedIdentifier,
    /// `U&'…'`.
    UnicodeCharacterStringLiteral,
    /// `_latin1` character set introducer.
    SqlLanguageIdentifier,

    /// `'…'`.
    CharacterStringLiteral,
    /// String following `DATE`.
    DateString,
    /// String following `TIME`.
    TimeString,
    /// String following `TIMESTAMP`.
    TimestampString,
    /// String following `INTERVAL`.
    IntervalString,
    /// `"…"`.
    DelimitedIdentifier,
    /// A single special character.
    SqlSpecialCharacter,
    /// `<>`.
    NotEqualsOperator,
    /// `>=`.
    GreaterThanOrEqualsOperator,
    /// `<=`.
    LessThanOrEqualsOperator,
    /// `||`.
    ConcatenationOperator,
    /// `->`.
    RightArrow,
    /// `??(`.
    LeftBracketTrigraph,
    /// `??)`.
    RightBracketTrigraph,
    /// `::`.
    DoubleColon,
    /// `..`.
    DoublePeriod,
    /// `=>`.
    NamedArgumentAssignmentToken,
    /// `{-`.
    LeftBraceMinus,
    /// `-}`.
    RightMinusBrace,
}

impl TokenType {
    /// Identifiers, keywords and non-string literals.
    pub fn is_non_delimiter(self) -> bool {
        self >= TokenType::RegularIdentifier && self <= TokenType::SqlLanguageIdentifier
    }

    /// String literals, delimited identifiers, punctuation and operators.
    pub fn is_delimiter(self) -> bool {
        self >= TokenType::CharacterStringLiteral && self <= TokenType::RightMinusBrace
    }

    /// Stable name of the type.
    pub fn name(self) -> &'static str {
        use TokenType::*;
        match self {
            Unknown => "Unknown",
            Error => "Error",
            Eof => "EOF",
            RegularIdentifier => "RegularIdentifier",
            KeyWord => "KeyWord",
            UnsignedNumericLiteral => "UnsignedNumericLiteral",
            NationalCharacterStringLiteral => "NationalCharacterStringLiteral",
            BinaryStringLiteral => "BinaryStringLiteral",
            LargeObjectLengthToken => "LargeObjectLengthToken",
            UnicodeDelimitedIdentifier => "UnicodeDelimitedIdentifier",
            UnicodeCharacterStringLiteral => "UnicodeCharacterStringLiteral",
            SqlLanguageIdentifier => "SQLLanguageIdentifier",
            CharacterStringLiteral => "CharacterStringLiteral",
            DateString => "DateString",
            TimeString => "TimeString",
            TimestampString => "TimestampString",
            IntervalString => "IntervalString",
            DelimitedIdentifier => "DelimitedIdentifier",
            SqlSpecialCharacter => "SQLSpecialCharacter",
            NotEqualsOperator => "NotEqualsOperator",
            GreaterThanOrEqualsOperator => "GreaterThanOrEqualsOperator",
            LessThanOrEqualsOperator => "LessThanOrEqualsOperator",
            ConcatenationOperator => "ConcatenationOperator",
            RightArrow => "RightArrow",
            LeftBracketTrigraph => "LeftBracketTrigraph",
            RightBracketTrigraph => "RightBracketTrigraph",
            DoubleColon => "DoubleColon",
            DoublePeriod => "DoublePeriod",
            NamedArgumentAssignmentToken => "NamedArgumentAssignmentToken",
            LeftBraceMinus => "LeftBraceMinus",
            RightMinusBrace => "RightMinusBrace",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexical unit with its position in the source text.
///
/// `offset` and `length` are measured in bytes, `line` and `col` are
/// 1-based and count characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Token type.
    pub typ: TokenType,
    /// Line of the first character.
    pub line: usize,
    /// Column of the first character.
    pub col: usize,
    /// Byte offset of the first character.
    pub offset: usize,
    /// Length in bytes.
    pub length: usize,
    /// Raw text, or the diagnostic for [`TokenType::Error`].
    pub value: String,
}

impl Token {
    /// Construct a token.
    pub fn new(
        typ: TokenType,
        line: usize,
        col: usize,
        offset: usize,
        length: usize,
        value: impl Into<String>,
    ) -> Self {
        Self { typ, line, col, offset, length, value: value.into() }
    }

    /// Zero-length end-of-input marker.
    pub fn eof(line: usize, col: usize, offset: usize) -> Self {
        Self::new(TokenType::Eof, line, col, offset, 0, "")
    }

    /// Byte offset just past the token.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Reports whether the token spells `kw`.
    ///
    /// Non-reserved words scan as regular identifiers and still match here.
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(self.typ, TokenType::KeyWord | TokenType::RegularIdentifier)
            && self.value.eq_ignore_ascii_case(kw.as_str())
    }

    /// Reports whether the token is the special character `c`.
    pub fn is_special(&self, c: char) -> bool {
        self.typ == TokenType::SqlSpecialCharacter && self.value.chars().eq(std::iter::once(c))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {} {:?}", self.line, self.col, self.typ, self.value)
    }
}
