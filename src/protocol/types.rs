//! Line Framing Data Types
//!
//! This module defines the data types used by the line framing layer.
//! The wire format is as simple as a protocol gets: a raw byte stream in
//! which a single newline byte (`0x0A`, `\n`) terminates each line.
//!
//! ## Framing Rules
//!
//! - A **line** is a maximal run of bytes up to and including one newline.
//! - The newline is the only delimiter. Carriage returns (`\r`) are ordinary
//!   content bytes and are echoed back untouched.
//! - Lines are binary-safe: any byte other than `\n` may appear as content,
//!   including null bytes and invalid UTF-8.
//!
//! ## Examples
//!
//! Simple line: `hello\n`
//! Empty line: `\n`
//! CRLF input: `hello\r\n` (content is `hello\r`)

use bytes::Bytes;
use std::fmt;

/// The newline byte that terminates every line
pub const NEWLINE: u8 = b'\n';

/// A single complete line received from a client.
///
/// A `Line` always carries its trailing newline, so echoing it back is a
/// single write of [`Line::as_bytes`]. The payload is a `bytes::Bytes`,
/// which makes cloning cheap (it's just a reference count bump, no copy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    bytes: Bytes,
}

impl Line {
    /// Creates a line from its raw bytes, trailing newline included.
    ///
    /// # Example
    /// ```
    /// use echoline::protocol::types::Line;
    /// let line = Line::new("hello\n");
    /// assert_eq!(line.content(), b"hello");
    /// ```
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        debug_assert_eq!(bytes.last(), Some(&NEWLINE));
        Self { bytes }
    }

    /// The full wire representation: content plus the trailing newline.
    ///
    /// This is exactly what gets written back to the client.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The line's content, excluding the trailing newline.
    ///
    /// Used for logging; the echoed bytes always come from
    /// [`Line::as_bytes`].
    pub fn content(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() - 1]
    }

    /// Total length in bytes, including the trailing newline.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the line has no content before its newline.
    pub fn is_empty(&self) -> bool {
        self.bytes.len() == 1
    }
}

/// Lossy UTF-8 rendering of the content, for operator-facing logs.
///
/// Display never includes the trailing newline and never affects what is
/// echoed over the wire.
impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.content()))
    }
}
