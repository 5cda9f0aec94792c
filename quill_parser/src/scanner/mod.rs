//! State-machine scanner.
//!
//! The scanner walks the input one character at a time. Each [`State`]
//! consumes characters, emits zero or more tokens onto a [`Stream`] and
//! names the state to run next; `None` hands control back to the dispatcher.
//! Lexical errors become `Error` tokens, and exactly one `EOF` token closes
//! every scan.

mod states;
mod syntax_error;
pub mod terminal;

pub use states::State;
pub use syntax_error::{ScanFault, SyntaxError};

use crate::matcher::Matcher;
use crate::token::{Keyword, MemoryStream, Stream, Token, TokenType};
use std::sync::Arc;
use terminal::NEWLINE;
use tracing::{debug, trace};

/// Snapshot of the scanner cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    start: usize,
    pos: usize,
    start_line: usize,
    start_col: usize,
    line: usize,
    last_col: usize,
    col: usize,
}

/// Lexer over an owned copy of the input.
pub struct Scanner {
    input: String,
    stream: Arc<dyn Stream>,

    start: usize,
    pos: usize,
    start_line: usize,
    start_col: usize,
    line: usize,
    last_col: usize,
    col: usize,

    state: &'static str,
    typed_literal: Option<TokenType>,
    emitted: usize,
}

impl Scanner {
    /// Create a scanner that pushes its tokens onto `stream`.
    pub fn new(input: impl Into<String>, stream: Arc<dyn Stream>) -> Self {
        Self {
            input: input.into(),
            stream,
            start: 0,
            pos: 0,
            start_line: 1,
            start_col: 1,
            line: 1,
            last_col: 1,
            col: 1,
            state: "scan_start",
            typed_literal: None,
            emitted: 0,
        }
    }

    /// Run the state machine to completion.
    ///
    /// A [`ScanFault::Syntax`] is reported as an `Error` token and ends the
    /// scan normally. Any other fault aborts the scan and is returned. `EOF` is
    /// emitted in every case unless the stream was closed by the consumer.
    pub fn scan(self) -> Result<(), ScanFault> {
        self.scan_from(None)
    }

    fn scan_from(mut self, initial: Option<State>) -> Result<(), ScanFault> {
        let outcome = match self.run(initial) {
            Err(ScanFault::Syntax(err)) => {
                debug!(%err, "scanner recovered");
                self.emit_error(format!("recovered: {err}"))
            }
            other => other,
        };
        let eof = Token::eof(self.line, self.col, self.pos);
        let pushed = self.stream.push(eof);
        debug!(tokens = self.emitted + 1, ok = outcome.is_ok(), "scan finished");
        match pushed {
            Err(e) if outcome.is_ok() && !self.stream.is_closed() => Err(e.into()),
            _ => outcome,
        }
    }

    fn run(&mut self, initial: Option<State>) -> Result<(), ScanFault> {
        let mut state = initial;
        loop {
            let current = match state.take() {
                Some(s) => s,
                None if self.done() => return Ok(()),
                None => State::Start,
            };
            self.state = current.name();
            state = self.step(current)?;
        }
    }

    /// Input exhausted, or the consumer closed the stream.
    pub fn done(&self) -> bool {
        self.pos >= self.input.len() || self.stream.is_closed()
    }

    /// Consume one character.
    ///
    /// Reading past the end of input is a fault carrying the running state.
    pub fn next(&mut self) -> Result<char, ScanFault> {
        match self.peek() {
            Some(c) => {
                self.advance(c);
                Ok(c)
            }
            None => Err(SyntaxError {
                offset: self.pos,
                line: self.line,
                col: self.col,
                message: format!("unexpected end of input in {}", self.state),
            }
            .into()),
        }
    }

    fn advance(&mut self, c: char) {
        self.pos += c.len_utf8();
        if NEWLINE.matches(c) {
            self.line += 1;
            self.last_col = self.col;
            self.col = 1;
        } else {
            self.col += 1;
        }
    }

    /// The next character, if any.
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    /// Undo exactly one [`Scanner::next`].
    pub fn goback(&mut self) {
        let Some(c) = self.input[..self.pos].chars().next_back() else {
            return;
        };
        self.pos -= c.len_utf8();
        if NEWLINE.matches(c) {
            self.line -= 1;
            self.col = self.last_col;
            self.last_col = self.previous_line_end_col();
        } else {
            self.col -= 1;
        }
    }

    // Column of the terminator ending the line before the cursor's line.
    fn previous_line_end_col(&self) -> usize {
        let before = &self.input[..self.pos];
        let Some((idx, _)) = before.char_indices().rev().find(|&(_, c)| NEWLINE.matches(c)) else {
            return 1;
        };
        let line_start = before[..idx]
            .char_indices()
            .rev()
            .find(|&(_, c)| NEWLINE.matches(c))
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        before[line_start..idx].chars().count() + 1
    }

    /// Snapshot the cursor.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            start: self.start,
            pos: self.pos,
            start_line: self.start_line,
            start_col: self.start_col,
            line: self.line,
            last_col: self.last_col,
            col: self.col,
        }
    }

    /// Rewind the cursor to `cp`.
    pub fn restore(&mut self, cp: Checkpoint) {
        self.start = cp.start;
        self.pos = cp.pos;
        self.start_line = cp.start_line;
        self.start_col = cp.start_col;
        self.line = cp.line;
        self.last_col = cp.last_col;
        self.col = cp.col;
    }

    /// Consume the next character if `m` matches it.
    pub fn accept(&mut self, m: Matcher) -> bool {
        match self.peek() {
            Some(c) if m.matches(c) => {
                self.advance(c);
                true
            }
            _ => false,
        }
    }

    /// Consume characters while `m` matches; returns how many.
    pub fn accept_multiple(&mut self, m: Matcher) -> usize {
        let mut n = 0;
        while self.accept(m) {
            n += 1;
        }
        n
    }

    /// Consume `s` entirely or nothing at all.
    pub fn accept_string(&mut self, s: &str) -> bool {
        self.accept_str_with(s, |a, b| a == b)
    }

    /// Like [`Scanner::accept_string`], ignoring ASCII case.
    pub fn accept_string_ignore_case(&mut self, s: &str) -> bool {
        self.accept_str_with(s, |a, b| a.eq_ignore_ascii_case(&b))
    }

    fn accept_str_with(&mut self, s: &str, eq: impl Fn(char, char) -> bool) -> bool {
        let cp = self.checkpoint();
        for want in s.chars() {
            match self.peek() {
                Some(c) if eq(c, want) => self.advance(c),
                _ => {
                    self.restore(cp);
                    return false;
                }
            }
        }
        true
    }

    /// Reports whether the input continues with `s`, without consuming.
    pub fn peek_string(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn peek_string_ignore_case(&self, s: &str) -> bool {
        self.rest().get(..s.len()).is_some_and(|p| p.eq_ignore_ascii_case(s))
    }

    /// Emit the text between the token start and the cursor as a `typ` token.
    pub fn emit(&mut self, typ: TokenType) -> Result<(), ScanFault> {
        let value = &self.input[self.start..self.pos];
        let next_literal = match typ {
            TokenType::KeyWord => typed_literal_after(value),
            _ => None,
        };
        self.push(typ, value.to_owned())?;
        self.typed_literal = next_literal;
        Ok(())
    }

    fn emit_error(&mut self, message: String) -> Result<(), ScanFault> {
        self.typed_literal = None;
        self.push(TokenType::Error, message)
    }

    fn push(&mut self, typ: TokenType, value: String) -> Result<(), ScanFault> {
        let token = Token::new(
            typ,
            self.start_line,
            self.start_col,
            self.start,
            self.pos - self.start,
            value,
        );
        trace!(state = self.state, token = %token, "emit");
        self.stream.push(token)?;
        self.emitted += 1;
        self.ignore();
        Ok(())
    }

    /// Drop the text between the token start and the cursor.
    pub fn ignore(&mut self) {
        self.start = self.pos;
        self.start_line = self.line;
        self.start_col = self.col;
    }
}

fn typed_literal_after(keyword: &str) -> Option<TokenType> {
    match Keyword::lookup(keyword)? {
        Keyword::Date => Some(TokenType::DateString),
        Keyword::Time => Some(TokenType::TimeString),
        Keyword::Timestamp => Some(TokenType::TimestampString),
        Keyword::Interval => Some(TokenType::IntervalString),
        _ => None,
    }
}

/// The `EOF` token a complete scan of `input` ends with.
pub(crate) fn eof_at_end(input: &str) -> Token {
    let (line, col) = input.chars().fold((1, 1), |(line, col), c| {
        if NEWLINE.matches(c) {
            (line + 1, 1)
        } else {
            (line, col + 1)
        }
    });
    Token::eof(line, col, input.len())
}

/// Scan `sql` synchronously and return every token, including `Error` and
/// `EOF`, together with the scanner outcome.
pub fn scan_all(sql: &str) -> (Vec<Token>, Result<(), ScanFault>) {
    let stream = Arc::new(MemoryStream::new());
    let outcome = Scanner::new(sql, stream.clone()).scan();
    (stream.drain(), outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType::*;

    fn scanner(input: &str) -> Scanner {
        Scanner::new(input, Arc::new(MemoryStream::new()))
    }

    fn types(sql: &str) -> Vec<TokenType> {
        let (tokens, outcome) = scan_all(sql);
        assert!(outcome.is_ok(), "{outcome:?}");
        tokens.into_iter().map(|t| t.typ).collect()
    }

    fn single(sql: &str) -> Token {
        let (tokens, outcome) = scan_all(sql);
        assert!(outcome.is_ok(), "{outcome:?}");
        assert_eq!(tokens.len(), 2, "{tokens:?}");
        assert_eq!(tokens[1].typ, Eof);
        tokens[0].clone()
    }

    #[test]
    fn goback_reverses_next() {
        let mut s = scanner("a\nb");
        assert_eq!(s.next().unwrap(), 'a');
        let before = s.checkpoint();
        assert_eq!(s.next().unwrap(), '\n');
        assert_eq!((s.line, s.col), (2, 1));
        s.goback();
        assert_eq!(s.checkpoint(), before);
        s.goback();
        assert_eq!((s.pos, s.line, s.col), (0, 1, 1));
    }

    #[test]
    fn goback_across_two_lines() {
        let mut s = scanner("ab\n\nc");
        for _ in 0..4 {
            s.next().unwrap();
        }
        assert_eq!((s.line, s.col), (3, 1));
        s.goback();
        assert_eq!((s.line, s.col), (2, 1));
        s.goback();
        assert_eq!((s.line, s.col), (1, 3));
    }

    #[test]
    fn checkpoint_restore_round_trip() {
        let mut s = scanner("SELECT x");
        s.accept_multiple(terminal::IDENTIFIER_PART);
        let cp = s.checkpoint();
        s.restore(cp);
        assert_eq!(s.checkpoint(), cp);
        s.next().unwrap();
        s.restore(cp);
        assert_eq!(s.checkpoint(), cp);
    }

    #[test]
    fn accept_string_is_transactional() {
        let mut s = scanner("??x");
        assert!(!s.accept_string("??("));
        assert_eq!(s.pos, 0);
        assert!(s.peek_string("??"));
        assert!(s.accept_string("??"));
        assert_eq!(s.pos, 2);
        assert!(!s.accept(terminal::DIGIT));
        assert!(s.accept(terminal::IDENTIFIER_START));
        assert!(!s.accept(terminal::IDENTIFIER_START));
    }

    #[test]
    fn next_past_end_is_a_syntax_fault() {
        let mut s = scanner("");
        match s.next() {
            Err(ScanFault::Syntax(e)) => assert!(e.message.contains("scan_start")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn select_keyword() {
        let t = single("SELECT");
        assert_eq!(t.typ, KeyWord);
        assert_eq!((t.offset, t.length), (0, 6));
        assert_eq!(t.value, "SELECT");
    }

    #[test]
    fn empty_input_emits_only_eof() {
        let (tokens, outcome) = scan_all("");
        assert!(outcome.is_ok());
        assert_eq!(tokens, vec![Token::eof(1, 1, 0)]);
    }

    #[test]
    fn eof_at_end_agrees_with_the_scanner() {
        for sql in ["", "SELECT", "SELECT\n  ab", "'é'\nx -- c\n"] {
            let (tokens, _) = scan_all(sql);
            assert_eq!(tokens.last(), Some(&eof_at_end(sql)), "{sql:?}");
        }
        assert_eq!(eof_at_end("SELECT\n  ab"), Token::eof(2, 5, 11));
    }

    #[test]
    fn unterminated_delimited_identifier() {
        let (tokens, outcome) = scan_all("\"abc");
        assert!(outcome.is_ok());
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].typ, Error);
        assert!(tokens[0].value.contains("expected Double Quote"), "{}", tokens[0].value);
        assert_eq!((tokens[0].offset, tokens[0].length), (0, 4));
        assert_eq!(tokens[1].typ, Eof);
    }

    #[test]
    fn error_token_does_not_stop_scanning() {
        assert_eq!(types("X'zz' a"), vec![Error, RegularIdentifier, Eof]);
        assert_eq!(types("1e+ x"), vec![Error, RegularIdentifier, Eof]);
        assert_eq!(types("\"\" y"), vec![Error, RegularIdentifier, Eof]);
        assert_eq!(types("/* open"), vec![Error, Eof]);
    }

    #[test]
    fn unexpected_rune_aborts_after_eof() {
        let (tokens, outcome) = scan_all("a # b");
        assert!(matches!(outcome, Err(ScanFault::UnexpectedRune { rune: '#', offset: 2, .. })));
        assert_eq!(tokens.iter().map(|t| t.typ).collect::<Vec<_>>(), vec![RegularIdentifier, Eof]);
    }

    #[test]
    fn reading_past_end_inside_a_state_is_recovered() {
        let stream = Arc::new(MemoryStream::new());
        let outcome = Scanner::new("", stream.clone()).scan_from(Some(State::Delimiter));
        assert!(outcome.is_ok());
        let tokens = stream.drain();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].typ, Error);
        assert!(tokens[0].value.starts_with("recovered: syntax error at 1:1 (offset 0)"));
        assert_eq!(tokens[1].typ, Eof);
    }

    #[test]
    fn identifiers_and_keywords() {
        assert_eq!(single("foo_bar1").typ, RegularIdentifier);
        assert_eq!(single("from").typ, KeyWord);
        assert_eq!(single("nulls").typ, RegularIdentifier);
        assert_eq!(single("größe").value, "größe");
        let quoted = single("\"a\"\"b\"");
        assert_eq!((quoted.typ, quoted.value.as_str()), (DelimitedIdentifier, "\"a\"\"b\""));
    }

    #[test]
    fn numeric_literals() {
        for sql in ["12", "1.5", ".5", "1.", "1E10", "2.5e-3"] {
            assert_eq!(single(sql).typ, UnsignedNumericLiteral, "{sql}");
        }
        assert_eq!(single("10K").typ, LargeObjectLengthToken);
        assert_eq!(types("10Kb"), vec![UnsignedNumericLiteral, RegularIdentifier, Eof]);
        assert_eq!(types("1else"), vec![UnsignedNumericLiteral, KeyWord, Eof]);
        assert_eq!(types("2.5e"), vec![UnsignedNumericLiteral, RegularIdentifier, Eof]);
        let (tokens, _) = scan_all("1else");
        assert_eq!((tokens[0].value.as_str(), tokens[1].value.as_str()), ("1", "else"));
        assert_eq!((tokens[1].offset, tokens[1].col), (1, 2));
        assert_eq!(
            types("1..2"),
            vec![UnsignedNumericLiteral, DoublePeriod, UnsignedNumericLiteral, Eof]
        );
    }

    #[test]
    fn string_literals() {
        assert_eq!(single("'it''s'").typ, CharacterStringLiteral);
        assert_eq!(single("N'x'").typ, NationalCharacterStringLiteral);
        assert_eq!(single("x'0A ff'").typ, BinaryStringLiteral);
        assert_eq!(single("U&'\\0041'").typ, UnicodeCharacterStringLiteral);
        assert_eq!(single("u&\"col\"").typ, UnicodeDelimitedIdentifier);
        assert_eq!(types("_latin1'abc'"), vec![SqlLanguageIdentifier, CharacterStringLiteral, Eof]);
        assert_eq!(
            types("_latin1 x"),
            vec![SqlSpecialCharacter, RegularIdentifier, RegularIdentifier, Eof]
        );
    }

    #[test]
    fn typed_strings_follow_their_keyword() {
        assert_eq!(types("DATE '2020-01-01'"), vec![KeyWord, DateString, Eof]);
        assert_eq!(types("time '10:00'"), vec![KeyWord, TimeString, Eof]);
        assert_eq!(types("TIMESTAMP '2020-01-01 10:00'"), vec![KeyWord, TimestampString, Eof]);
        assert_eq!(types("INTERVAL '1'"), vec![KeyWord, IntervalString, Eof]);
        assert_eq!(types("DATE x '1'"), vec![KeyWord, RegularIdentifier, CharacterStringLiteral, Eof]);
    }

    #[test]
    fn delimiters() {
        let cases = [
            ("<>", NotEqualsOperator),
            (">=", GreaterThanOrEqualsOperator),
            ("<=", LessThanOrEqualsOperator),
            ("||", ConcatenationOperator),
            ("->", RightArrow),
            ("??(", LeftBracketTrigraph),
            ("??)", RightBracketTrigraph),
            ("::", DoubleColon),
            ("..", DoublePeriod),
            ("=>", NamedArgumentAssignmentToken),
            ("{-", LeftBraceMinus),
            ("-}", RightMinusBrace),
            ("(", SqlSpecialCharacter),
            ("?", SqlSpecialCharacter),
        ];
        for (sql, typ) in cases {
            let t = single(sql);
            assert_eq!(t.typ, typ, "{sql}");
            assert_eq!(t.length, sql.len());
        }
    }

    #[test]
    fn separators_are_skipped_and_positions_tracked() {
        let (tokens, _) = scan_all("-- note\nSELECT /* c\n */ a,\n  b");
        let positions: Vec<_> =
            tokens.iter().map(|t| (t.value.as_str(), t.line, t.col, t.offset)).collect();
        assert_eq!(
            positions,
            vec![("SELECT", 2, 1, 8), ("a", 3, 5, 24), (",", 3, 6, 25), ("b", 4, 3, 29), ("", 4, 4, 30)]
        );
    }
}
