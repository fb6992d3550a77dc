//! # echoline - A Concurrent Line-Oriented TCP Echo Server
//!
//! echoline accepts TCP connections, reassembles each client's byte stream
//! into newline-delimited lines, and echoes every completed line back to the
//! client that sent it. It is small on purpose: the interesting parts are the
//! per-connection framing state machine and the ownership model that lets
//! many clients be served independently without a single lock.
//!
//! ## Features
//!
//! - **Binary-Safe Framing**: only `\n` delimits; everything else is content
//! - **Bounded Lines**: oversized lines are rejected with a diagnostic, never
//!   truncated or corrupted
//! - **Async I/O**: built on Tokio, one task per connection
//! - **Verbose Mode**: optionally logs each received line server-side
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              echoline                                   │
//! │                                                                         │
//! │  ┌─────────────┐    ┌──────────────────┐    ┌─────────────┐            │
//! │  │ TCP Server  │───>│   Connection     │───>│    Line     │            │
//! │  │ (Listener)  │    │    Handler       │    │   Framer    │            │
//! │  └─────────────┘    │ (one per client) │    └──────┬──────┘            │
//! │                     └──────────────────┘           │                    │
//! │                              ▲                     │ complete line      │
//! │                              │                     ▼                    │
//! │                              │            ┌─────────────────┐           │
//! │                              └────────────│  Echo + log     │           │
//! │                                 write     │  (verbose)      │           │
//! │                                           └─────────────────┘           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use echoline::connection::{handle_connection, ConnectionConfig, ConnectionStats};
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ConnectionConfig::new(true); // verbose
//!     let stats = Arc::new(ConnectionStats::new());
//!
//!     let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
//!     echoline::server::run(listener, config, stats).await;
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: newline framing - the `Line` type and the bounded framer
//! - [`connection`]: per-client handler, configuration snapshot, statistics
//! - [`server`]: the accept loop that spawns one handler task per client
//!
//! ## Design Highlights
//!
//! ### Exclusive Ownership
//!
//! Every resource except the listening socket - stream, accumulator,
//! configuration snapshot - is owned by exactly one handler task for its
//! entire lifetime. There is zero mutable state shared across tasks, so
//! the data path needs zero locks. The shared [`connection::ConnectionStats`]
//! counters are atomics used for observability only.
//!
//! ### Chunk-Boundary Independence
//!
//! The framer makes no alignment assumption between transport reads and
//! application lines. One read may complete several lines; one line may
//! span many reads. Echoed output depends only on the bytes and where the
//! newlines sit, never on how the transport fragments them.
//!
//! ### Bounded Accumulation
//!
//! The in-progress line lives in a growable buffer whose growth the framer
//! bounds. A line exceeding the limit terminates that connection with a
//! logged diagnostic; other connections are unaffected.

pub mod connection;
pub mod protocol;
pub mod server;

// Re-export commonly used types for convenience
pub use connection::{handle_connection, ConnectionConfig, ConnectionError, ConnectionStats};
pub use protocol::{FrameError, Line, LineFramer, DEFAULT_MAX_LINE_LEN};

/// The default port echoline listens on
pub const DEFAULT_PORT: u16 = 8080;

/// The default host echoline binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of echoline
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
