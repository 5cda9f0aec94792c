use super::Token;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Blocking operations wake up this often to notice [`Stream::close`].
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Failure of a stream operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The stream was closed; no further operation is allowed.
    #[error("token stream is closed")]
    Closed,
    /// No token arrived before the deadline.
    #[error("timed out waiting for a token")]
    Timeout,
    /// A non-blocking stream has nothing left to take.
    #[error("token stream is exhausted")]
    Exhausted,
}

/// FIFO of tokens between exactly one producer and one consumer.
pub trait Stream: Send + Sync {
    /// Enqueue a token, blocking while the stream is full.
    fn push(&self, token: Token) -> Result<(), StreamError>;
    /// Dequeue the oldest token, blocking until one is available.
    fn take(&self) -> Result<Token, StreamError>;
    /// Return the oldest token without removing it.
    fn peek(&self) -> Result<Token, StreamError>;
    /// Mark the stream closed. Subsequent operations fail with [`StreamError::Closed`].
    fn close(&self);
    /// Reports whether [`Stream::close`] was called.
    fn is_closed(&self) -> bool;
}

/// Bounded blocking stream connecting the scanner thread to the parser.
pub struct TokenStream {
    tx: Sender<Token>,
    rx: Receiver<Token>,
    peeked: Mutex<Option<Token>>,
    closed: AtomicBool,
}

impl TokenStream {
    /// Create a stream buffering at most `capacity` tokens (at least one).
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = channel::bounded(capacity.max(1));
        Self { tx, rx, peeked: Mutex::new(None), closed: AtomicBool::new(false) }
    }

    fn guard(&self) -> Result<(), StreamError> {
        if self.is_closed() {
            return Err(StreamError::Closed);
        }
        Ok(())
    }

    /// Like [`Stream::take`], but gives up at `deadline`.
    pub fn take_deadline(&self, deadline: Instant) -> Result<Token, StreamError> {
        self.guard()?;
        if let Some(token) = self.peeked.lock().take() {
            return Ok(token);
        }
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(StreamError::Timeout);
            }
            match self.rx.recv_timeout(POLL_INTERVAL.min(deadline - now)) {
                Ok(token) => return Ok(token),
                Err(RecvTimeoutError::Timeout) => self.guard()?,
                Err(RecvTimeoutError::Disconnected) => return Err(StreamError::Closed),
            }
        }
    }
}

impl Stream for TokenStream {
    fn push(&self, mut token: Token) -> Result<(), StreamError> {
        self.guard()?;
        loop {
            match self.tx.send_timeout(token, POLL_INTERVAL) {
                Ok(()) => return Ok(()),
                Err(SendTimeoutError::Timeout(t)) => {
                    self.guard()?;
                    token = t;
                }
                Err(SendTimeoutError::Disconnected(_)) => return Err(StreamError::Closed),
            }
        }
    }

    fn take(&self) -> Result<Token, StreamError> {
        self.guard()?;
        if let Some(token) = self.peeked.lock().take() {
            return Ok(token);
        }
        loop {
            match self.rx.recv_timeout(POLL_INTERVAL) {
                Ok(token) => return Ok(token),
                Err(RecvTimeoutError::Timeout) => self.guard()?,
                Err(RecvTimeoutError::Disconnected) => return Err(StreamError::Closed),
            }
        }
    }

    fn peek(&self) -> Result<Token, StreamError> {
        self.guard()?;
        let mut peeked = self.peeked.lock();
        if let Some(token) = peeked.as_ref() {
            return Ok(token.clone());
        }
        let token = loop {
            match self.rx.recv_timeout(POLL_INTERVAL) {
                Ok(token) => break token,
                Err(RecvTimeoutError::Timeout) => self.guard()?,
                Err(RecvTimeoutError::Disconnected) => return Err(StreamError::Closed),
            }
        };
        *peeked = Some(token.clone());
        Ok(token)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Unbounded, non-blocking stream used to scan synchronously.
#[derive(Default)]
pub struct MemoryStream {
    tokens: Mutex<VecDeque<Token>>,
    closed: AtomicBool,
}

impl MemoryStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every buffered token.
    pub fn drain(&self) -> Vec<Token> {
        self.tokens.lock().drain(..).collect()
    }
}

impl Stream for MemoryStream {
    fn push(&self, token: Token) -> Result<(), StreamError> {
        if self.is_closed() {
            return Err(StreamError::Closed);
        }
        self.tokens.lock().push_back(token);
        Ok(())
    }

    fn take(&self) -> Result<Token, StreamError> {
        if self.is_closed() {
            return Err(StreamError::Closed);
        }
        self.tokens.lock().pop_front().ok_or(StreamError::Exhausted)
    }

    fn peek(&self) -> Result<Token, StreamError> {
        if self.is_closed() {
            return Err(StreamError::Closed);
        }
        self.tokens.lock().front().cloned().ok_or(StreamError::Exhausted)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;
    use std::sync::Arc;
    use std::thread;

    fn tok(offset: usize) -> Token {
        Token::new(TokenType::SqlSpecialCharacter, 1, offset + 1, offset, 1, ",")
    }

    #[test]
    fn fifo_with_peek() {
        let s = TokenStream::new(5);
        s.push(tok(0)).unwrap();
        s.push(tok(1)).unwrap();
        assert_eq!(s.peek().unwrap().offset, 0);
        assert_eq!(s.peek().unwrap().offset, 0);
        assert_eq!(s.take().unwrap().offset, 0);
        assert_eq!(s.take().unwrap().offset, 1);
    }

    #[test]
    fn closed_stream_fails_fast() {
        let s = TokenStream::new(5);
        s.push(tok(0)).unwrap();
        s.close();
        assert!(s.is_closed());
        assert_eq!(s.push(tok(1)), Err(StreamError::Closed));
        assert_eq!(s.take(), Err(StreamError::Closed));
        assert_eq!(s.peek(), Err(StreamError::Closed));
    }

    #[test]
    fn take_deadline_times_out() {
        let s = TokenStream::new(1);
        let started = Instant::now();
        let res = s.take_deadline(Instant::now() + Duration::from_millis(50));
        assert_eq!(res, Err(StreamError::Timeout));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn full_stream_push_unblocks_on_close() {
        let s = Arc::new(TokenStream::new(1));
        s.push(tok(0)).unwrap();
        let producer = {
            let s = Arc::clone(&s);
            thread::spawn(move || s.push(tok(1)))
        };
        thread::sleep(Duration::from_millis(30));
        s.close();
        assert_eq!(producer.join().unwrap(), Err(StreamError::Closed));
    }

    #[test]
    fn concurrent_producer_preserves_order() {
        let s = Arc::new(TokenStream::new(5));
        let producer = {
            let s = Arc::clone(&s);
            thread::spawn(move || {
                for i in 0..100 {
                    s.push(tok(i)).unwrap();
                }
            })
        };
        for i in 0..100 {
            assert_eq!(s.take().unwrap().offset, i);
        }
        producer.join().unwrap();
    }

    #[test]
    fn memory_stream_is_non_blocking() {
        let s = MemoryStream::new();
        assert_eq!(s.take(), Err(StreamError::Exhausted));
        s.push(tok(0)).unwrap();
        s.push(tok(1)).unwrap();
        assert_eq!(s.peek().unwrap().offset, 0);
        assert_eq!(s.drain().len(), 2);
        s.close();
        assert_eq!(s.push(tok(2)), Err(StreamError::Closed));
    }
}
