//! Connection Handler Module
//!
//! This module handles individual client connections to echoline.
//! Each client gets its own handler task that runs in a loop,
//! reading bytes, framing lines, and echoing them back.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Read bytes from socket  │ │
//!    │  └───────────┬─────────────┘ │
//!    │              │               │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Frame complete lines    │ │
//!    │  └───────────┬─────────────┘ │
//!    │              │               │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Echo each line back     │ │
//!    │  │ (log it when verbose)   │ │
//!    │  └───────────┬─────────────┘ │
//!    │              │               │
//!    │              ▼               │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. Client disconnects / error
//!        │
//!        ▼
//! 5. Handler task ends, connection closed
//! ```
//!
//! ## Buffer Management
//!
//! We use a BytesMut buffer to accumulate incoming data. This is important
//! because TCP is a stream protocol - we might receive partial lines,
//! or multiple lines in a single read. After every read, the handler drains
//! all complete lines from the buffer; whatever remains is the in-progress
//! line, whose growth the framer bounds.

use crate::protocol::{FrameError, Line, LineFramer, DEFAULT_MAX_LINE_LEN};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Per-connection configuration, snapshotted at accept time.
///
/// Each handler receives its own copy, so a worker never reads shared
/// mutable state. `Copy` keeps the handoff at spawn time trivial.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionConfig {
    /// Log each received line's content when enabled
    pub verbose: bool,
    /// Maximum accepted line length in bytes, newline included
    pub max_line_len: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

impl ConnectionConfig {
    /// Creates a configuration with the given verbose flag and the default
    /// line length limit.
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }
}

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total lines echoed back to clients
    pub lines_echoed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn line_echoed(&self) {
        self.lines_echoed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
///
/// This struct owns the connection end-to-end: the read buffer, the framer,
/// and the write side. Nothing else reads or writes this stream for its
/// entire lifetime, so the handler needs no locks.
pub struct ConnectionHandler {
    /// The TCP stream for this connection
    stream: BufWriter<TcpStream>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Accumulator for incoming data; holds at most one in-progress line
    /// after each framing pass
    buffer: BytesMut,

    /// Line framer with the configured length bound
    framer: LineFramer,

    /// Per-connection configuration snapshot
    config: ConnectionConfig,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl ConnectionHandler {
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The TCP stream for this connection
    /// * `addr` - The client's socket address
    /// * `config` - The per-connection configuration snapshot
    /// * `stats` - Shared connection statistics
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        config: ConnectionConfig,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            framer: LineFramer::new(config.max_line_len),
            config,
            stats,
        }
    }

    /// Runs the main connection loop.
    ///
    /// This method reads bytes from the client, frames and echoes lines,
    /// until the client disconnects or an error occurs. The connection is
    /// closed exactly once, on every exit path, when the handler is dropped.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Connection closed"),
            Err(e) => match e {
                ConnectionError::ClientDisconnected => {
                    info!(client = %self.addr, "Connection closed")
                }
                ConnectionError::Io(io_err)
                    if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
                {
                    debug!(client = %self.addr, "Connection reset by client")
                }
                _ => warn!(client = %self.addr, error = %e, "Connection error"),
            },
        }

        self.stats.connection_closed();
        result
    }

    /// The main read-frame-echo loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            // Drain every complete line currently in the buffer; a single
            // read may have completed several
            while let Some(line) = self.try_frame_line()? {
                self.echo_line(&line).await?;
            }

            // Need more data - read from the socket
            self.read_more_data().await?;
        }
    }

    /// Attempts to frame one line from the buffer.
    fn try_frame_line(&mut self) -> Result<Option<Line>, ConnectionError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        match self.framer.parse(&self.buffer) {
            Ok(Some((line, consumed))) => {
                // Successfully framed a line - consume the bytes
                let _ = self.buffer.split_to(consumed);
                trace!(
                    client = %self.addr,
                    consumed = consumed,
                    remaining = self.buffer.len(),
                    "Framed line"
                );
                Ok(Some(line))
            }
            Ok(None) => {
                // Incomplete line - need to read more
                trace!(
                    client = %self.addr,
                    buffered = self.buffer.len(),
                    "Incomplete line, need more data"
                );
                Ok(None)
            }
            Err(e) => {
                // Over the length limit - reject this connection
                warn!(client = %self.addr, error = %e, "Rejecting oversized line");
                Err(ConnectionError::Frame(e))
            }
        }
    }

    /// Reads more data from the socket into the buffer.
    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        // Ensure we have some capacity
        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(4096);
        }

        // Read data
        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        if n == 0 {
            // Connection closed by client. A partial line left in the
            // buffer is discarded, not an error.
            if !self.buffer.is_empty() {
                debug!(
                    client = %self.addr,
                    discarded = self.buffer.len(),
                    "Stream ended mid-line, partial line discarded"
                );
            }
            return Err(ConnectionError::ClientDisconnected);
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(())
    }

    /// Echoes a complete line back to the client.
    ///
    /// The verbose log shows the content without its newline; the echoed
    /// bytes are always the full line, newline included.
    async fn echo_line(&mut self, line: &Line) -> Result<(), ConnectionError> {
        if self.config.verbose {
            info!(client = %self.addr, "Received: {}", line);
        }

        self.stream.write_all(line.as_bytes()).await?;
        self.stream.flush().await?;

        self.stats.line_echoed();
        self.stats.bytes_written(line.len());
        trace!(
            client = %self.addr,
            bytes = line.len(),
            "Echoed line"
        );
        Ok(())
    }
}

/// Errors that can occur while handling a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Line framing error (oversized line)
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Client disconnected normally
    #[error("Client disconnected")]
    ClientDisconnected,
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion. Errors are per-connection: they are logged
/// inside `run` and never propagate to the caller or to other connections.
///
/// # Arguments
///
/// * `stream` - The TCP stream for this connection
/// * `addr` - The client's socket address
/// * `config` - The per-connection configuration snapshot
/// * `stats` - Shared connection statistics
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    config: ConnectionConfig,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, config, stats);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::ClientDisconnected => {}
            ConnectionError::Io(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(client = %addr, error = %e, "Connection ended with error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn create_test_server(config: ConnectionConfig) -> (SocketAddr, Arc<ConnectionStats>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stats = Arc::new(ConnectionStats::new());

        let stats_clone = Arc::clone(&stats);

        tokio::spawn(async move {
            while let Ok((stream, client_addr)) = listener.accept().await {
                let stats = Arc::clone(&stats_clone);
                tokio::spawn(handle_connection(stream, client_addr, config, stats));
            }
        });

        (addr, stats)
    }

    /// Reads from the client until `expected` bytes arrive or the server
    /// closes the connection.
    async fn read_exactly(client: &mut TcpStream, expected: usize) -> Vec<u8> {
        let mut out = vec![0u8; expected];
        let mut total = 0;
        while total < expected {
            match client.read(&mut out[total..]).await.unwrap() {
                0 => break,
                n => total += n,
            }
        }
        out.truncate(total);
        out
    }

    #[tokio::test]
    async fn test_echo_single_line() {
        let (addr, _) = create_test_server(ConnectionConfig::default()).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"hello\n").await.unwrap();

        let echoed = read_exactly(&mut client, 6).await;
        assert_eq!(echoed, b"hello\n");
    }

    #[tokio::test]
    async fn test_echo_two_lines_in_one_write() {
        let (addr, _) = create_test_server(ConnectionConfig::default()).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"foo\nbar\n").await.unwrap();

        // Client-observable result is the concatenation of both echoes
        let echoed = read_exactly(&mut client, 8).await;
        assert_eq!(echoed, b"foo\nbar\n");
    }

    #[tokio::test]
    async fn test_echo_byte_at_a_time() {
        let (addr, _) = create_test_server(ConnectionConfig::default()).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        for &b in b"fragmented line\n".iter() {
            client.write_all(&[b]).await.unwrap();
        }

        let echoed = read_exactly(&mut client, 16).await;
        assert_eq!(echoed, b"fragmented line\n");
    }

    #[tokio::test]
    async fn test_line_spanning_multiple_writes() {
        let (addr, _) = create_test_server(ConnectionConfig::default()).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"hel").await.unwrap();
        client.write_all(b"lo wo").await.unwrap();
        client.write_all(b"rld\n").await.unwrap();

        let echoed = read_exactly(&mut client, 12).await;
        assert_eq!(echoed, b"hello world\n");
    }

    #[tokio::test]
    async fn test_partial_line_at_eof_not_echoed() {
        let (addr, _) = create_test_server(ConnectionConfig::default()).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"complete\nincomplete").await.unwrap();
        client.shutdown().await.unwrap();

        // Only the newline-terminated line comes back, then EOF
        let mut echoed = Vec::new();
        client.read_to_end(&mut echoed).await.unwrap();
        assert_eq!(echoed, b"complete\n");
    }

    #[tokio::test]
    async fn test_echo_preserves_binary_content() {
        let (addr, _) = create_test_server(ConnectionConfig::default()).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        let input = b"bin\x00\xff\r\n";
        client.write_all(input).await.unwrap();

        let echoed = read_exactly(&mut client, input.len()).await;
        assert_eq!(echoed, input);
    }

    #[tokio::test]
    async fn test_verbose_mode_does_not_alter_echo() {
        let (addr, _) = create_test_server(ConnectionConfig::new(true)).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"logged line\n").await.unwrap();

        let echoed = read_exactly(&mut client, 12).await;
        assert_eq!(echoed, b"logged line\n");
    }

    #[tokio::test]
    async fn test_oversized_line_closes_connection() {
        let config = ConnectionConfig {
            verbose: false,
            max_line_len: 16,
        };
        let (addr, _) = create_test_server(config).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        // 32 bytes without a newline: over the limit, connection rejected
        client.write_all(&[b'x'; 32]).await.unwrap();

        // The server closes without echoing; depending on timing the close
        // may surface as EOF or as a reset
        let mut buf = Vec::new();
        match client.read_to_end(&mut buf).await {
            Ok(_) => assert!(buf.is_empty(), "rejected connection must echo nothing"),
            Err(_) => {}
        }
    }

    #[tokio::test]
    async fn test_server_survives_oversized_client() {
        let config = ConnectionConfig {
            verbose: false,
            max_line_len: 16,
        };
        let (addr, _) = create_test_server(config).await;

        let mut bad = TcpStream::connect(addr).await.unwrap();
        bad.write_all(&[b'x'; 64]).await.unwrap();
        let mut sink = Vec::new();
        let _ = bad.read_to_end(&mut sink).await;

        // A well-behaved client connecting afterwards is served normally
        let mut good = TcpStream::connect(addr).await.unwrap();
        good.write_all(b"still here\n").await.unwrap();
        let echoed = read_exactly(&mut good, 11).await;
        assert_eq!(echoed, b"still here\n");
    }

    #[tokio::test]
    async fn test_connection_stats() {
        let (addr, stats) = create_test_server(ConnectionConfig::default()).await;

        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);

        let mut client = TcpStream::connect(addr).await.unwrap();

        // Give the server time to accept the connection
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 1);
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 1);

        client.write_all(b"ping\n").await.unwrap();
        let _ = read_exactly(&mut client, 5).await;

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(stats.lines_echoed.load(Ordering::Relaxed), 1);
        assert!(stats.bytes_read.load(Ordering::Relaxed) >= 5);
        assert!(stats.bytes_written.load(Ordering::Relaxed) >= 5);

        // Close connection
        drop(client);

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);
    }
}
