use super::terminal::*;
use super::{Checkpoint, ScanFault, Scanner};
use crate::matcher::Matcher;
use crate::token::TokenType;

/// Multi-character delimiters, longest first where prefixes overlap.
const OPERATORS: &[(&str, TokenType)] = &[
    ("??(", TokenType::LeftBracketTrigraph),
    ("??)", TokenType::RightBracketTrigraph),
    ("<>", TokenType::NotEqualsOperator),
    (">=", TokenType::GreaterThanOrEqualsOperator),
    ("<=", TokenType::LessThanOrEqualsOperator),
    ("||", TokenType::ConcatenationOperator),
    ("->", TokenType::RightArrow),
    ("::", TokenType::DoubleColon),
    ("..", TokenType::DoublePeriod),
    ("=>", TokenType::NamedArgumentAssignmentToken),
    ("{-", TokenType::LeftBraceMinus),
    ("-}", TokenType::RightMinusBrace),
];

/// A unit of lexing behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// Dispatch on the next character.
    Start,
    /// Whitespace and comments.
    Separator,
    /// Regular identifier or keyword.
    Word,
    /// `_charset` before a string literal.
    Introducer,
    /// `"…"`.
    DelimitedIdentifier,
    /// `U&"…"`.
    UnicodeDelimitedIdentifier,
    /// Exact, approximate and large object length numerals.
    Number,
    /// `'…'`, typed after `DATE`, `TIME`, `TIMESTAMP` and `INTERVAL`.
    CharacterString,
    /// `N'…'`.
    NationalString,
    /// `U&'…'`.
    UnicodeString,
    /// `X'…'`.
    BinaryString,
    /// Operators and special characters.
    Delimiter,
    /// Emit an `Error` token covering the input up to `resume`.
    Error {
        /// Diagnostic text.
        message: String,
        /// Byte offset at which scanning continues.
        resume: usize,
    },
}

impl State {
    /// Name used in diagnostics and logs.
    pub fn name(&self) -> &'static str {
        match self {
            State::Start => "scan_start",
            State::Separator => "scan_separator",
            State::Word => "scan_word",
            State::Introducer => "scan_introducer",
            State::DelimitedIdentifier => "scan_delimited_identifier",
            State::UnicodeDelimitedIdentifier => "scan_unicode_delimited_identifier",
            State::Number => "scan_number",
            State::CharacterString => "scan_character_string",
            State::NationalString => "scan_national_string",
            State::UnicodeString => "scan_unicode_string",
            State::BinaryString => "scan_binary_string",
            State::Delimiter => "scan_delimiter",
            State::Error { .. } => "scan_error",
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

type Next = Result<Option<State>, ScanFault>;

impl Scanner {
    pub(super) fn step(&mut self, state: State) -> Next {
        match state {
            State::Start => self.scan_start(),
            State::Separator => self.scan_separator(),
            State::Word => self.scan_word(),
            State::Introducer => self.scan_introducer(),
            State::DelimitedIdentifier => self.scan_delimited(None, TokenType::DelimitedIdentifier),
            State::UnicodeDelimitedIdentifier => {
                self.scan_delimited(Some("U&"), TokenType::UnicodeDelimitedIdentifier)
            }
            State::Number => self.scan_number(),
            State::CharacterString => {
                let typ = self.typed_literal.unwrap_or(TokenType::CharacterStringLiteral);
                self.scan_string(None, typ)
            }
            State::NationalString => {
                self.scan_string(Some("N"), TokenType::NationalCharacterStringLiteral)
            }
            State::UnicodeString => {
                self.scan_string(Some("U&"), TokenType::UnicodeCharacterStringLiteral)
            }
            State::BinaryString => self.scan_binary_string(),
            State::Delimiter => self.scan_delimiter(),
            State::Error { message, resume } => self.scan_error(message, resume),
        }
    }

    /// Roll back to `cp` and schedule an `Error` token that skips everything
    /// consumed so far, and at least one character.
    fn fail(&mut self, cp: Checkpoint, expected: impl std::fmt::Display) -> State {
        let first = self.input[cp.pos..].chars().next().map_or(0, char::len_utf8);
        let resume = self.pos.max(cp.pos + first);
        self.restore(cp);
        State::Error { message: format!("unexpected lexical unit: expected {expected}"), resume }
    }

    fn scan_start(&mut self) -> Next {
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let next = if WHITE_SPACE.matches(c) || self.peek_string("--") || self.peek_string("/*") {
            State::Separator
        } else if self.peek_string_ignore_case("N'") {
            State::NationalString
        } else if self.peek_string_ignore_case("X'") {
            State::BinaryString
        } else if self.peek_string_ignore_case("U&'") {
            State::UnicodeString
        } else if self.peek_string_ignore_case("U&\"") {
            State::UnicodeDelimitedIdentifier
        } else if UNDERSCORE.matches(c) && self.introduces_string() {
            State::Introducer
        } else if IDENTIFIER_START.matches(c) {
            State::Word
        } else if DOUBLE_QUOTE.matches(c) {
            State::DelimitedIdentifier
        } else if DIGIT.matches(c) || (PERIOD.matches(c) && self.peek_nth(1).is_some_and(|d| DIGIT.matches(d))) {
            State::Number
        } else if QUOTE.matches(c) {
            State::CharacterString
        } else if SQL_SPECIAL_CHARACTER.matches(c) {
            State::Delimiter
        } else {
            return Err(ScanFault::UnexpectedRune {
                rune: c,
                offset: self.pos,
                line: self.line,
                col: self.col,
            });
        };
        Ok(Some(next))
    }

    // `_name'` ahead of the cursor.
    fn introduces_string(&mut self) -> bool {
        let cp = self.checkpoint();
        let found = self.accept(UNDERSCORE)
            && self.accept(IDENTIFIER_START)
            && {
                self.accept_multiple(IDENTIFIER_PART);
                self.peek().is_some_and(|c| QUOTE.matches(c))
            };
        self.restore(cp);
        found
    }

    fn scan_separator(&mut self) -> Next {
        loop {
            if self.accept_multiple(WHITE_SPACE) > 0 {
                continue;
            }
            if self.accept_string("--") {
                while let Some(c) = self.peek() {
                    if NEWLINE.matches(c) {
                        break;
                    }
                    self.next()?;
                }
                continue;
            }
            if self.peek_string("/*") {
                self.ignore();
                let cp = self.checkpoint();
                self.accept_string("/*");
                while !self.accept_string("*/") {
                    if self.peek().is_none() {
                        return Ok(Some(self.fail(cp, "*/")));
                    }
                    self.next()?;
                }
                continue;
            }
            break;
        }
        self.ignore();
        Ok(None)
    }

    fn scan_word(&mut self) -> Next {
        let cp = self.checkpoint();
        if !self.accept(IDENTIFIER_START) {
            return Ok(Some(self.fail(cp, IDENTIFIER_START)));
        }
        self.accept_multiple(IDENTIFIER_PART);
        let reserved = crate::token::Keyword::lookup(&self.input[self.start..self.pos])
            .is_some_and(|kw| kw.is_reserved());
        self.emit(if reserved { TokenType::KeyWord } else { TokenType::RegularIdentifier })?;
        Ok(None)
    }

    fn scan_introducer(&mut self) -> Next {
        let cp = self.checkpoint();
        if !(self.accept(UNDERSCORE) && self.accept(IDENTIFIER_START)) {
            return Ok(Some(self.fail(cp, IDENTIFIER_START)));
        }
        self.accept_multiple(IDENTIFIER_PART);
        if !self.peek().is_some_and(|c| QUOTE.matches(c)) {
            return Ok(Some(self.fail(cp, QUOTE)));
        }
        self.emit(TokenType::SqlLanguageIdentifier)?;
        Ok(Some(State::CharacterString))
    }

    /// Consume a quoted body, doubling `quote` to escape it.
    ///
    /// Returns the number of characters between the quotes, or an error state.
    fn quoted(&mut self, cp: Checkpoint, quote: Matcher) -> Result<usize, State> {
        if !self.accept(quote) {
            return Err(self.fail(cp, quote));
        }
        let mut len = 0;
        loop {
            match self.peek() {
                None => return Err(self.fail(cp, quote)),
                Some(c) if quote.matches(c) => {
                    self.advance(c);
                    if !self.accept(quote) {
                        return Ok(len);
                    }
                    len += 1;
                }
                Some(c) => {
                    self.advance(c);
                    len += 1;
                }
            }
        }
    }

    fn scan_delimited(&mut self, prefix: Option<&str>, typ: TokenType) -> Next {
        let cp = self.checkpoint();
        if let Some(prefix) = prefix {
            if !self.accept_string_ignore_case(prefix) {
                return Ok(Some(self.fail(cp, prefix)));
            }
        }
        match self.quoted(cp, DOUBLE_QUOTE) {
            Err(state) => Ok(Some(state)),
            Ok(0) => Ok(Some(self.fail(cp, "at least one delimited identifier part"))),
            Ok(_) => {
                self.emit(typ)?;
                Ok(None)
            }
        }
    }

    fn scan_string(&mut self, prefix: Option<&str>, typ: TokenType) -> Next {
        let cp = self.checkpoint();
        if let Some(prefix) = prefix {
            if !self.accept_string_ignore_case(prefix) {
                return Ok(Some(self.fail(cp, prefix)));
            }
        }
        match self.quoted(cp, QUOTE) {
            Err(state) => Ok(Some(state)),
            Ok(_) => {
                self.emit(typ)?;
                Ok(None)
            }
        }
    }

    fn scan_binary_string(&mut self) -> Next {
        let cp = self.checkpoint();
        if !self.accept_string_ignore_case("X") {
            return Ok(Some(self.fail(cp, "X")));
        }
        let body_start = self.pos + 1;
        if let Err(state) = self.quoted(cp, QUOTE) {
            return Ok(Some(state));
        }
        let body = &self.input[body_start..self.pos - 1];
        if !body.chars().all(|c| HEX_DIGIT.matches(c) || SPACE.matches(c)) {
            return Ok(Some(self.fail(cp, HEX_DIGIT)));
        }
        self.emit(TokenType::BinaryStringLiteral)?;
        Ok(None)
    }

    fn scan_number(&mut self) -> Next {
        let cp = self.checkpoint();
        let whole = self.accept_multiple(DIGIT);
        if whole > 0
            && self.peek().is_some_and(|c| MULTIPLIER.matches(c))
            && !self.peek_nth(1).is_some_and(|c| IDENTIFIER_PART.matches(c))
        {
            self.accept(MULTIPLIER);
            self.emit(TokenType::LargeObjectLengthToken)?;
            return Ok(None);
        }
        let mut fraction = 0;
        if self.peek().is_some_and(|c| PERIOD.matches(c)) && !self.peek_string("..") {
            self.accept(PERIOD);
            fraction = self.accept_multiple(DIGIT);
        }
        if whole + fraction == 0 {
            return Ok(Some(self.fail(cp, DIGIT)));
        }
        let mantissa = self.checkpoint();
        if self.accept_string_ignore_case("E") {
            let signed = self.accept(PLUS_SIGN) || self.accept(MINUS_SIGN);
            if self.accept_multiple(DIGIT) == 0 {
                if signed {
                    return Ok(Some(self.fail(cp, DIGIT)));
                }
                // A bare `E` begins the next word, as in `1else`.
                self.restore(mantissa);
            }
        }
        self.emit(TokenType::UnsignedNumericLiteral)?;
        Ok(None)
    }

    fn scan_delimiter(&mut self) -> Next {
        for (text, typ) in OPERATORS {
            if self.accept_string(text) {
                self.emit(*typ)?;
                return Ok(None);
            }
        }
        let c = self.next()?;
        if !SQL_SPECIAL_CHARACTER.matches(c) {
            self.goback();
            return Err(ScanFault::UnexpectedRune {
                rune: c,
                offset: self.pos,
                line: self.line,
                col: self.col,
            });
        }
        self.emit(TokenType::SqlSpecialCharacter)?;
        Ok(None)
    }

    fn scan_error(&mut self, message: String, resume: usize) -> Next {
        while self.pos < resume {
            self.next()?;
        }
        self.emit_error(message)?;
        Ok(None)
    }
}
