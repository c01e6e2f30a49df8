//! Error types for the relay
//!
//! Defines startup/connection errors and session send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Relay-level errors
///
/// Anything per-connection is handled locally inside the session task
/// (logged, then the close path runs); only listening-endpoint and
/// connect-time failures surface through this type.
#[derive(Debug, Error)]
pub enum RelayError {
    /// IO error (fatal for the operation that raised it)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Line send errors
///
/// Occurs when attempting to queue a line for a session that has closed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The session has been closed and accepts no further lines
    #[error("session closed")]
    SessionClosed,
}
