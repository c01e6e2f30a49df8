//! Text-Line Broadcast Relay Library
//!
//! A TCP chat relay built on tokio: the server accepts connections,
//! assigns each peer a unique `User<n>` identity, and relays every line a
//! peer sends to all connected peers.
//!
//! # Features
//! - Newline-delimited UTF-8 wire protocol, no framing or handshake
//! - Unique, never-reused identities announced on connect
//! - Snapshot-based fan-out that never races registry mutation
//! - Idempotent session close and one-shot coordinated shutdown
//! - Interactive and bot client modes
//!
//! # Architecture
//! One task per concern:
//! - the accept loop turns connections into registered sessions
//! - each session runs a read/dispatch task plus a writer task that
//!   serializes outgoing lines
//! - the [`Registry`] mutex is the only shared mutable state; broadcast
//!   and shutdown iterate a [`Registry::snapshot`], never the live map
//!
//! # Example
//! ```ignore
//! use linecast::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), linecast::RelayError> {
//!     let server = Server::bind(("0.0.0.0", 14001)).await?;
//!     let shutdown = server.shutdown_handle();
//!     tokio::spawn(server.run());
//!     // ... later:
//!     shutdown.trigger();
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod broadcaster;
pub mod config;
pub mod error;
pub mod registry;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use bot::{BotAction, Responder};
pub use broadcaster::Broadcaster;
pub use config::{ClientConfig, ServerConfig};
pub use error::{RelayError, SendError};
pub use registry::Registry;
pub use server::{Server, ShutdownHandle};
pub use session::SessionHandle;
pub use types::SessionId;
