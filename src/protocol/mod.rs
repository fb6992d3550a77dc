//! Line Protocol Implementation
//!
//! This module implements the newline-delimited framing used by echoline.
//!
//! ## Overview
//!
//! The "protocol" is deliberately minimal: clients send raw bytes, and a
//! single newline byte (`\n`) terminates each line. There is no length
//! prefix, no record size, and no escaping - the delimiter byte is the
//! entire framing story. The framer reassembles lines regardless of how
//! the transport fragments them.
//!
//! ## Modules
//!
//! - `types`: Defines the `Line` value type and the delimiter constant
//! - `framer`: Incremental, bounded framer for incoming byte streams
//!
//! ## Example
//!
//! ```ignore
//! use echoline::protocol::{LineFramer, parse_line};
//!
//! // Framing incoming data
//! let data = b"hello\n";
//! let (line, consumed) = parse_line(data).unwrap().unwrap();
//!
//! // Echoing back
//! let bytes = line.as_bytes();
//! ```

pub mod framer;
pub mod types;

// Re-export commonly used types for convenience
pub use framer::{parse_line, FrameError, FrameResult, LineFramer, DEFAULT_MAX_LINE_LEN};
pub use types::{Line, NEWLINE};
