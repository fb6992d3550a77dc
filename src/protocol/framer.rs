//! Incremental Line Framer
//!
//! This module turns a raw TCP byte stream into discrete newline-terminated
//! lines. TCP gives no alignment guarantees: a single read may contain half
//! a line, exactly one line, or a dozen lines, so the framer is written to
//! be resumable and chunk-boundary-independent.
//!
//! ## How the Framer Works
//!
//! The framer reads from a buffer and returns either:
//! - `Ok(Some((line, consumed)))` - Successfully framed a line, `consumed` bytes were used
//! - `Ok(None)` - Need more data, no newline seen yet
//! - `Err(FrameError)` - The line exceeds the configured maximum length
//!
//! This design allows the caller to:
//! 1. Append incoming network data to a buffer
//! 2. Call `parse()` to attempt framing
//! 3. If successful, advance the buffer by `consumed` bytes and repeat
//!    (a single read may complete several lines)
//! 4. If incomplete, wait for more data
//! 5. If error, report the diagnostic and disconnect the client
//!
//! ## Bounded Lines
//!
//! The accumulator never grows without limit. Each framer carries a maximum
//! line length (newline included); a line that exceeds it is rejected with
//! [`FrameError::LineTooLong`] rather than truncated or silently corrupted.
//! The check fires as soon as the limit is unreachable, so an attacker
//! streaming an endless newline-free payload is cut off at the limit, not
//! at memory exhaustion.

use crate::protocol::types::{Line, NEWLINE};
use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur during line framing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// A line exceeds the maximum allowed length
    #[error("line too long: {length} bytes (limit: {limit})")]
    LineTooLong { length: usize, limit: usize },
}

/// Result type for framing operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Default maximum line length (64 KiB, trailing newline included)
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;

/// An incremental newline framer with a bounded line length.
///
/// # Example
///
/// ```ignore
/// use echoline::protocol::framer::LineFramer;
/// use bytes::{Buf, BytesMut};
///
/// let framer = LineFramer::default();
/// let mut buffer = BytesMut::from(&b"hello\nwor"[..]);
///
/// if let Some((line, consumed)) = framer.parse(&buffer)? {
///     buffer.advance(consumed);
///     assert_eq!(line.content(), b"hello");
/// }
/// // "wor" stays buffered until its newline arrives
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LineFramer {
    /// Maximum accepted line length, newline included
    max_line_len: usize,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}

impl LineFramer {
    /// Creates a framer that rejects lines longer than `max_line_len` bytes
    /// (trailing newline included).
    pub fn new(max_line_len: usize) -> Self {
        debug_assert!(max_line_len > 0);
        Self { max_line_len }
    }

    /// The configured maximum line length.
    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }

    /// Attempts to frame one line from the front of the buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((line, consumed)))` - Successfully framed a line
    /// - `Ok(None)` - Incomplete, need more bytes
    /// - `Err(e)` - Line over the length limit
    ///
    /// # Arguments
    ///
    /// * `buf` - The accumulator holding unframed bytes
    pub fn parse(&self, buf: &[u8]) -> FrameResult<Option<(Line, usize)>> {
        if buf.is_empty() {
            return Ok(None);
        }

        match find_newline(buf) {
            Some(pos) => {
                // +1 to include the newline itself
                let consumed = pos + 1;
                if consumed > self.max_line_len {
                    return Err(FrameError::LineTooLong {
                        length: consumed,
                        limit: self.max_line_len,
                    });
                }

                let line = Line::new(Bytes::copy_from_slice(&buf[..consumed]));
                Ok(Some((line, consumed)))
            }
            None => {
                // No newline yet. If the unterminated prefix already fills
                // the limit, any future newline would land past it.
                if buf.len() >= self.max_line_len {
                    return Err(FrameError::LineTooLong {
                        length: buf.len(),
                        limit: self.max_line_len,
                    });
                }
                Ok(None) // Incomplete
            }
        }
    }
}

/// Finds the position of the first newline byte in the buffer.
#[inline]
fn find_newline(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == NEWLINE)
}

/// Helper function to frame a single line from bytes with the default limit.
///
/// This is a convenience function for simple use cases.
pub fn parse_line(buf: &[u8]) -> FrameResult<Option<(Line, usize)>> {
    LineFramer::default().parse(buf)
}
