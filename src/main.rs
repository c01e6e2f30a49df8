//! Text-Line Broadcast Relay - Server Entry Point
//!
//! Binds the listening endpoint, runs the accept loop, and watches the
//! admin console: the literal line `EXIT` (or Ctrl-C) shuts the server
//! down.

use std::env;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use linecast::{Server, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=linecast=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("linecast=info")),
        )
        .init();

    let config = ServerConfig::from_args(env::args().skip(1));

    let server = Server::bind(("0.0.0.0", config.port)).await?;
    info!("relay server listening on port {}", config.port);

    let shutdown = server.shutdown_handle();
    let accept_loop = tokio::spawn(server.run());

    // Admin console loop.
    let mut console = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received");
                break;
            }
            line = console.next_line() => match line {
                Ok(Some(line)) if line.trim() == "EXIT" => break,
                Ok(Some(_)) => {}
                Ok(None) => break, // console closed
                Err(e) => {
                    error!("console read failed: {}", e);
                    break;
                }
            }
        }
    }

    shutdown.trigger();
    accept_loop.await?;
    info!("server stopped");

    Ok(())
}
