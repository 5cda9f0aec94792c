use super::{Diagnostic, DiagnosticKind, Diagnostics, Error, Fault};
use crate::ast::{NodeInfo, NodeType, Query};
use crate::config::ParserConfig;
use crate::scanner::{eof_at_end, ScanFault, Scanner};
use crate::token::{Keyword, Stream, StreamError, Token, TokenStream, TokenType};
use parking_lot::Mutex;
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Result of a grammar function: `Ok(None)` means the production did not match.
pub(super) type PResult<T> = Result<Option<T>, Fault>;

/// Words that end a list element during error recovery.
const CLAUSE_KEYWORDS: &[Keyword] = &[
    Keyword::From,
    Keyword::Where,
    Keyword::Group,
    Keyword::Having,
    Keyword::Order,
    Keyword::Offset,
    Keyword::Fetch,
    Keyword::Union,
    Keyword::Except,
    Keyword::Intersect,
    Keyword::Join,
    Keyword::On,
    Keyword::Using,
];

/// State of a single parse call.
pub(super) struct Isolate<'a> {
    sql: &'a str,
    config: &'a ParserConfig,

    pub(super) pos: usize,
    tokens: Vec<Token>,

    errors: Mutex<Vec<Diagnostic>>,
    depth: usize,
}

impl<'a> Isolate<'a> {
    pub(super) fn new(sql: &'a str, config: &'a ParserConfig) -> Self {
        Self { sql, config, pos: 0, tokens: Vec::new(), errors: Mutex::new(Vec::new()), depth: 0 }
    }

    pub(super) fn parse(self) -> Result<Query, Error> {
        let sql = self.sql.to_owned();
        self.parse_with(move |stream| Scanner::new(sql, stream).scan())
    }

    /// Parse the tokens produced by `producer` on a separate thread.
    pub(super) fn parse_with<F>(mut self, producer: F) -> Result<Query, Error>
    where
        F: FnOnce(Arc<dyn Stream>) -> Result<(), ScanFault> + Send + 'static,
    {
        let stream = Arc::new(TokenStream::new(self.config.stream_capacity));
        let handle = {
            let stream = Arc::clone(&stream);
            let eof = eof_at_end(self.sql);
            thread::Builder::new().name("quill-scanner".into()).spawn(move || {
                let shared: Arc<dyn Stream> = stream.clone();
                match panic::catch_unwind(AssertUnwindSafe(|| producer(shared))) {
                    Ok(outcome) => outcome,
                    Err(payload) => {
                        // The consumer may have closed the stream already.
                        if let Err(e) = stream.push(eof) {
                            debug!(%e, "EOF after scanner panic not delivered");
                        }
                        Err(ScanFault::Panicked(panic_message(payload)))
                    }
                }
            })
        };
        let handle = match handle {
            Ok(handle) => handle,
            Err(e) => return Err(self.unrecoverable(Fault::Spawn(e))),
        };

        match self.accumulate(&stream) {
            Ok(()) => {}
            Err(StreamError::Timeout) => {
                stream.close();
                let timeout = self.config.accumulate_timeout();
                warn!(?timeout, tokens = self.tokens.len(), "token accumulation timed out");
                return Err(Error::Timeout(timeout));
            }
            Err(e) => {
                stream.close();
                return Err(self.unrecoverable(Fault::Stream(e)));
            }
        }

        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(fault)) => return Err(self.unrecoverable(Fault::Scanner(fault))),
            Err(payload) => {
                return Err(self.unrecoverable(Fault::Scanner(ScanFault::Panicked(panic_message(
                    payload,
                )))))
            }
        }
        debug!(tokens = self.tokens.len(), diagnostics = self.error_count(), "tokens accumulated");

        let query = match self.build() {
            Ok(Ok(Ok(query))) => query,
            Ok(Ok(Err(fault))) => return Err(self.unrecoverable(fault)),
            Ok(Err(payload)) => return Err(self.unrecoverable(Fault::Panicked(panic_message(payload)))),
            Err(e) => return Err(self.unrecoverable(Fault::Spawn(e))),
        };

        let errors = std::mem::take(&mut *self.errors.lock());
        debug!(diagnostics = errors.len(), "parse finished");
        if errors.is_empty() {
            Ok(query)
        } else if errors.iter().any(|d| d.kind == DiagnosticKind::Lexical) {
            Err(Error::Scanner(Diagnostics(errors)))
        } else {
            Err(Error::Parser(Diagnostics(errors)))
        }
    }

    /// Drain the stream up to `EOF`, moving `Error` tokens into the diagnostics.
    fn accumulate(&mut self, stream: &TokenStream) -> Result<(), StreamError> {
        let deadline = Instant::now() + self.config.accumulate_timeout();
        loop {
            let token = stream.take_deadline(deadline)?;
            match token.typ {
                TokenType::Eof => return Ok(()),
                TokenType::Error => self.found_error(Diagnostic {
                    kind: DiagnosticKind::Lexical,
                    line: token.line,
                    col: token.col,
                    offset: token.offset,
                    message: token.value,
                }),
                _ => self.tokens.push(token),
            }
        }
    }

    fn unrecoverable(&self, fault: Fault) -> Error {
        let collected = Diagnostics(std::mem::take(&mut *self.errors.lock()));
        error!(%fault, diagnostics = collected.len(), "unrecoverable parse failure");
        Error::Unrecoverable { fault, collected }
    }

    /// Build the tree on a thread whose stack fits the configured depth.
    fn build(&mut self) -> io::Result<thread::Result<Result<Query, Fault>>> {
        let stack_size = self.config.stack_size();
        thread::scope(|scope| {
            let handle = thread::Builder::new()
                .name("quill-parser".into())
                .stack_size(stack_size)
                .spawn_scoped(scope, || self.query())?;
            Ok(handle.join())
        })
    }

    /// Root node wrapping the whole input.
    fn query(&mut self) -> Result<Query, Fault> {
        let query_expression = if self.tokens.is_empty() {
            None
        } else {
            let qe = self.require("query expression", |p| p.query_expression())?;
            self.accept_special(';');
            if !self.done() && !self.has_syntactic_errors() {
                self.expected("end of statement");
            }
            qe
        };
        Ok(Query {
            node: NodeInfo::new(1, 1, 0, self.sql.len(), NodeType::Root, self.sql),
            query_expression,
        })
    }

    // Diagnostics.

    pub(super) fn found_error(&self, diagnostic: Diagnostic) {
        self.errors.lock().push(diagnostic);
    }

    pub(super) fn error_count(&self) -> usize {
        self.errors.lock().len()
    }

    fn has_syntactic_errors(&self) -> bool {
        self.errors.lock().iter().any(|d| d.kind == DiagnosticKind::Syntactic)
    }

    /// Record that `what` was expected at the cursor.
    pub(super) fn expected(&self, what: &str) {
        let (line, col, offset) = self.position();
        let found = match self.peek() {
            Some(t) => format!("{} {:?}", t.typ, t.value),
            None => "end of input".to_owned(),
        };
        self.found_error(Diagnostic {
            kind: DiagnosticKind::Syntactic,
            line,
            col,
            offset,
            message: format!("expected {what}, found {found}"),
        });
    }

    /// Like [`Isolate::expected`], unless something was reported since `before`.
    pub(super) fn expected_since(&self, before: usize, what: &str) {
        if self.error_count() == before {
            self.expected(what);
        }
    }

    /// Run a mandatory production, reporting `what` if it fails silently.
    pub(super) fn require<T>(
        &mut self,
        what: &str,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        let before = self.error_count();
        let result = f(self)?;
        if result.is_none() {
            self.expected_since(before, what);
        }
        Ok(result)
    }

    /// Run a speculative production. On no match, the cursor and the
    /// diagnostics are rolled back.
    pub(super) fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let pos = self.pos;
        let before = self.error_count();
        let result = f(self)?;
        if result.is_none() {
            self.pos = pos;
            self.errors.lock().truncate(before);
        }
        Ok(result)
    }

    /// Run `f` one nesting level deeper.
    pub(super) fn descend<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let limit = self.config.depth_limit();
        if self.depth >= limit {
            return Err(Fault::DepthExceeded(limit));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Parse `item, item, …`. A failed element is reported and skipped so
    /// that later elements are still checked. The list is never optional:
    /// an empty result has always been reported.
    pub(super) fn comma_list<T>(
        &mut self,
        what: &str,
        mut item: impl FnMut(&mut Self) -> PResult<T>,
    ) -> Result<Vec<T>, Fault> {
        let mut items = Vec::new();
        loop {
            let start = self.pos;
            let before = self.error_count();
            match item(self)? {
                Some(it) => items.push(it),
                None if items.is_empty() && self.pos == start && self.error_count() == before => {
                    self.expected(what);
                    return Ok(items);
                }
                None => {
                    self.expected_since(before, what);
                    self.skip_list_element();
                }
            }
            if self.accept_special(',').is_none() {
                return Ok(items);
            }
        }
    }

    // Skip to the next `,`, `)`, `;` or clause keyword outside parentheses.
    fn skip_list_element(&mut self) {
        let mut depth = 0usize;
        while let Some(t) = self.peek() {
            if t.is_special('(') {
                depth += 1;
            } else if t.is_special(')') {
                if depth == 0 {
                    return;
                }
                depth -= 1;
            } else if depth == 0
                && (t.is_special(',')
                    || t.is_special(';')
                    || CLAUSE_KEYWORDS.iter().any(|kw| t.typ == TokenType::KeyWord && t.is_keyword(*kw)))
            {
                return;
            }
            self.pos += 1;
        }
    }

    // Cursor.

    pub(super) fn done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Token at the cursor, advancing past it.
    pub(super) fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.clone();
        self.pos += 1;
        Some(token)
    }

    /// Token at the cursor.
    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Token `n` positions after the cursor.
    pub(super) fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    /// Undo one [`Isolate::next`].
    pub(super) fn goback(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    pub(super) fn accept_token(&mut self, typ: TokenType) -> Option<Token> {
        match self.next() {
            Some(t) if t.typ == typ => Some(t),
            Some(_) => {
                self.goback();
                None
            }
            None => None,
        }
    }

    /// Consume the whole run of `types` or nothing.
    pub(super) fn accept_token_sequence(&mut self, types: &[TokenType]) -> Option<Vec<Token>> {
        let pos = self.pos;
        let mut result = Vec::with_capacity(types.len());
        for typ in types {
            match self.accept_token(*typ) {
                Some(t) => result.push(t),
                None => {
                    self.pos = pos;
                    return None;
                }
            }
        }
        Some(result)
    }

    pub(super) fn accept_one_of_types(&mut self, types: &[TokenType]) -> Option<Token> {
        match self.next() {
            Some(t) if types.contains(&t.typ) => Some(t),
            Some(_) => {
                self.goback();
                None
            }
            None => None,
        }
    }

    pub(super) fn accept_keyword(&mut self, kw: Keyword) -> Option<Token> {
        match self.next() {
            Some(t) if t.is_keyword(kw) => Some(t),
            Some(_) => {
                self.goback();
                None
            }
            None => None,
        }
    }

    pub(super) fn accept_one_of_keywords(&mut self, kws: &[Keyword]) -> Option<Token> {
        kws.iter().find_map(|kw| self.accept_keyword(*kw))
    }

    /// Consume the whole run of `kws` or nothing.
    pub(super) fn accept_keywords(&mut self, kws: &[Keyword]) -> Option<Vec<Token>> {
        let pos = self.pos;
        let mut result = Vec::with_capacity(kws.len());
        for kw in kws {
            match self.accept_keyword(*kw) {
                Some(t) => result.push(t),
                None => {
                    self.pos = pos;
                    return None;
                }
            }
        }
        Some(result)
    }

    pub(super) fn accept_special(&mut self, c: char) -> Option<Token> {
        match self.next() {
            Some(t) if t.is_special(c) => Some(t),
            Some(_) => {
                self.goback();
                None
            }
            None => None,
        }
    }

    /// Consume `c` or report it as expected.
    pub(super) fn expect_special(&mut self, c: char) -> Option<Token> {
        let token = self.accept_special(c);
        if token.is_none() {
            self.expected(&format!("'{c}'"));
        }
        token
    }

    /// Consume `kw` or report it as expected.
    pub(super) fn expect_keyword(&mut self, kw: Keyword) -> Option<Token> {
        let token = self.accept_keyword(kw);
        if token.is_none() {
            self.expected(kw.as_str());
        }
        token
    }

    pub(super) fn peek_keyword(&self, kw: Keyword) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(kw))
    }

    pub(super) fn peek_special(&self, c: char) -> bool {
        self.peek().is_some_and(|t| t.is_special(c))
    }

    // Positions.

    /// Position of the cursor, or just past the last token.
    fn position(&self) -> (usize, usize, usize) {
        if let Some(t) = self.peek() {
            return (t.line, t.col, t.offset);
        }
        match self.tokens.last() {
            Some(t) => (t.line, t.col + self.sql[t.offset..t.end()].chars().count(), t.end()),
            None => (1, 1, 0),
        }
    }

    /// Metadata spanning the tokens consumed since `from`.
    pub(super) fn node(&self, typ: NodeType, from: usize) -> NodeInfo {
        self.node_valued(typ, from, "")
    }

    pub(super) fn node_valued(&self, typ: NodeType, from: usize, value: impl Into<String>) -> NodeInfo {
        let last = self.pos.checked_sub(1).and_then(|i| self.tokens.get(i));
        match (self.tokens.get(from), last) {
            (Some(first), Some(last)) if self.pos > from => NodeInfo::spanning(typ, first, last, value),
            _ => {
                let (line, col, offset) = self.position();
                NodeInfo::new(line, col, offset, 0, typ, value)
            }
        }
    }

    #[cfg(test)]
    pub(super) fn with_tokens(sql: &'a str, config: &'a ParserConfig, tokens: Vec<Token>) -> Self {
        let mut isolate = Self::new(sql, config);
        isolate.tokens = tokens;
        isolate
    }

    #[cfg(test)]
    pub(super) fn diagnostics(&self) -> Vec<Diagnostic> {
        self.errors.lock().clone()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
