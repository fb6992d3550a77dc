//! Listener Loop
//!
//! Accepts connections on an already-bound listener and spawns one
//! independent handler task per client. The loop itself never blocks on a
//! handler's progress: its only suspension point is waiting for the next
//! incoming connection.
//!
//! A transient accept failure is logged and the loop keeps going; nothing a
//! single client does can take the listener down. Binding the socket is the
//! caller's job (see `main.rs`), which keeps this loop trivial to run
//! against an ephemeral port in tests.

use crate::connection::{handle_connection, ConnectionConfig, ConnectionStats};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::error;

/// Runs the accept loop until the surrounding task is dropped.
///
/// Each accepted connection gets its own task with a copy of `config`;
/// the accepted stream moves into that task, so even a task that never
/// runs drops (and thereby closes) its connection. Accept errors never
/// terminate the loop.
pub async fn run(listener: TcpListener, config: ConnectionConfig, stats: Arc<ConnectionStats>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let stats = Arc::clone(&stats);

                // Spawn a task to handle this connection
                tokio::spawn(async move {
                    handle_connection(stream, addr, config, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
