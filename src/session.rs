//! Per-connection session handling
//!
//! A session is one connected peer: a cloneable [`SessionHandle`] for
//! sending lines and closing, plus the [`run`] task that owns the socket
//! and drives the read/dispatch loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::Notify;
use tracing::{debug, info, trace};

use crate::broadcaster::Broadcaster;
use crate::error::SendError;
use crate::registry::Registry;
use crate::types::SessionId;

/// State shared between a session's handles and its tasks.
#[derive(Debug)]
struct Shared {
    id: SessionId,
    outbound: mpsc::UnboundedSender<String>,
    closed: AtomicBool,
    close_signal: Notify,
}

/// Cloneable handle to one connected peer
///
/// `send` may be called from any task concurrently with the session's own
/// read loop; lines are queued on an unbounded channel and a single writer
/// task serializes the physical writes. `close` is idempotent and wakes
/// both the read loop and the writer task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

impl SessionHandle {
    /// Create a handle together with the receiving end of its outbound
    /// line queue. The receiver is handed to [`run`], which drains it into
    /// the socket.
    pub fn new(id: SessionId) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let handle = Self {
            shared: Arc::new(Shared {
                id,
                outbound,
                closed: AtomicBool::new(false),
                close_signal: Notify::new(),
            }),
        };
        (handle, outbound_rx)
    }

    /// The identity assigned to this session at accept time.
    pub fn id(&self) -> SessionId {
        self.shared.id
    }

    /// Queue one line for delivery to the peer.
    ///
    /// Returns an error if the session has already closed.
    pub fn send(&self, line: impl Into<String>) -> Result<(), SendError> {
        if self.is_closed() {
            return Err(SendError::SessionClosed);
        }
        self.shared
            .outbound
            .send(line.into())
            .map_err(|_| SendError::SessionClosed)
    }

    /// Close the session.
    ///
    /// Idempotent: the first call clears the running state and wakes the
    /// session's tasks; every later call is a no-op. Safe to call from the
    /// read loop's disconnect branch and a concurrent server shutdown at
    /// the same moment.
    pub fn close(&self) {
        if !self.shared.closed.swap(true, Ordering::AcqRel) {
            debug!("{} is disconnecting", self.id());
            self.shared.close_signal.notify_waiters();
        }
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Resolve once `close` has been called. Cancellation-safe, so it can
    /// sit in a `select!` arm next to a blocking read.
    pub async fn closed(&self) {
        loop {
            // Register interest before checking the flag so a concurrent
            // notify_waiters cannot slip between check and await.
            let notified = self.shared.close_signal.notified();
            if self.is_closed() {
                return;
            }
            notified.await;
        }
    }
}

/// Drive one connection to completion.
///
/// Spawns the writer task, then runs the read/dispatch loop: each received
/// line is handed to the broadcaster together with this session's identity.
/// The loop ends on peer disconnect, an IO fault (treated identically), or
/// the handle being closed from outside. On exit the session closes itself
/// and removes its own registry entry; both steps are no-ops if shutdown
/// got there first.
pub async fn run(
    stream: TcpStream,
    handle: SessionHandle,
    outbound_rx: mpsc::UnboundedReceiver<String>,
    registry: Registry,
    broadcaster: Broadcaster,
) {
    let id = handle.id();
    let (read_half, write_half) = stream.into_split();
    let writer = tokio::spawn(write_loop(write_half, outbound_rx, handle.clone()));

    let mut lines = BufReader::new(read_half).lines();
    loop {
        tokio::select! {
            () = handle.closed() => break,
            read = lines.next_line() => match read {
                Ok(Some(line)) => {
                    trace!("{} sent: {}", id, line);
                    broadcaster.broadcast(id, &line);
                }
                Ok(None) => {
                    debug!("{} reached end of stream", id);
                    break;
                }
                Err(e) => {
                    // Resets and reads racing a concurrent close both land
                    // here; treated the same as end of stream.
                    debug!("read failed for {}: {}", id, e);
                    break;
                }
            }
        }
    }

    handle.close();
    registry.remove(id);
    let _ = writer.await;
    info!("{} disconnected", id);
}

/// Drain the outbound queue into the socket, one line per message.
///
/// Exits when the session closes or the peer stops accepting writes.
async fn write_loop(
    mut write_half: OwnedWriteHalf,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    handle: SessionHandle,
) {
    loop {
        tokio::select! {
            () = handle.closed() => break,
            queued = outbound_rx.recv() => match queued {
                Some(line) => {
                    if write_half.write_all(line.as_bytes()).await.is_err()
                        || write_half.write_all(b"\n").await.is_err()
                    {
                        debug!("write failed for {}, stopping writer", handle.id());
                        break;
                    }
                }
                None => break,
            }
        }
    }
    // Best effort; the peer may already be gone.
    let _ = write_half.shutdown().await;
}
