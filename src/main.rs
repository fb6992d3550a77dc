//! echoline - A Concurrent Line-Oriented TCP Echo Server
//!
//! This is the main entry point for the echoline server.
//! It parses the command line, sets up logging, binds the TCP listener,
//! and runs the accept loop until the process is terminated.

use echoline::connection::{ConnectionConfig, ConnectionStats};
use echoline::server;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
    /// Log each received line's content
    verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: echoline::DEFAULT_HOST.to_string(),
            port: echoline::DEFAULT_PORT,
            verbose: false,
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" => {
                    if i + 1 < args.len() {
                        config.host = args[i + 1].clone();
                        i += 2;
                    } else {
                        eprintln!("Error: --host requires a value");
                        std::process::exit(1);
                    }
                }
                "--port" | "-p" => {
                    if i + 1 < args.len() {
                        config.port = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid port number");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --port requires a value");
                        std::process::exit(1);
                    }
                }
                "--verbose" | "-v" => {
                    config.verbose = true;
                    i += 1;
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" => {
                    println!("echoline version {}", echoline::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }

    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn print_help() {
    println!(
        r#"
echoline - A Concurrent Line-Oriented TCP Echo Server

USAGE:
    echoline [OPTIONS]

OPTIONS:
    -p, --port <PORT>    Port to listen on (default: 8080)
    -v, --verbose        Log each received line's content
        --host <HOST>    Host to bind to (default: 127.0.0.1)
        --version        Print version information
        --help           Print this help message

EXAMPLES:
    echoline                       # Start on 127.0.0.1:8080
    echoline --port 9000           # Start on port 9000
    echoline -v                    # Log every received line
    echoline --host 0.0.0.0        # Listen on all interfaces

CONNECTING:
    Any TCP client works; every newline-terminated line is echoed back:
    $ nc localhost 8080
    hello
    hello
"#
    );
}

fn print_banner(config: &Config) {
    println!(
        r#"
echoline v{} - Concurrent Line-Oriented TCP Echo Server
──────────────────────────────────────────────────────────────
Server started on {}
Ready to accept connections.

Use Ctrl+C to shutdown.
"#,
        echoline::VERSION,
        config.bind_address()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    // Print the banner
    print_banner(&config);

    // Per-connection configuration, snapshotted once here and copied to
    // every handler at spawn time
    let connection_config = ConnectionConfig::new(config.verbose);

    // Create connection statistics
    let stats = Arc::new(ConnectionStats::new());

    // Bind the TCP listener; a bind failure is fatal before any
    // connection is accepted
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on {}", config.bind_address());

    // Set up shutdown on Ctrl+C
    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received, stopping server...");
    };

    // Main accept loop
    tokio::select! {
        _ = server::run(listener, connection_config, stats) => {}
        _ = shutdown => {}
    }

    info!("Server shutdown complete");
    Ok(())
}
