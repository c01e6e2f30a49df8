//! Relay server: accept loop and shutdown coordination
//!
//! [`Server`] owns the listening endpoint, the registry, and the identity
//! counter. [`ShutdownHandle`] drives the one-way `running → stopping →
//! stopped` transition that stops the accept loop and closes every
//! registered session.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::broadcaster::Broadcaster;
use crate::error::RelayError;
use crate::registry::Registry;
use crate::session::{self, SessionHandle};
use crate::types::SessionId;

const RUNNING: u8 = 0;
const STOPPING: u8 = 1;
const STOPPED: u8 = 2;

/// Fires the server's shutdown sequence, at most once per process.
///
/// Cheap to clone; every clone refers to the same state machine.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    state: Arc<AtomicU8>,
    signal: Arc<Notify>,
    registry: Registry,
}

impl ShutdownHandle {
    fn new(registry: Registry) -> Self {
        Self {
            state: Arc::new(AtomicU8::new(RUNNING)),
            signal: Arc::new(Notify::new()),
            registry,
        }
    }

    /// Run the shutdown sequence: stop the accept loop (which closes the
    /// listening endpoint) and close every registered session.
    ///
    /// Sessions are closed from a snapshot, since each close triggers that
    /// session's own removal from the live registry. Returns `false` if
    /// shutdown had already been triggered; the second call changes
    /// nothing.
    pub fn trigger(&self) -> bool {
        if self
            .state
            .compare_exchange(RUNNING, STOPPING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("shutdown already triggered");
            return false;
        }
        info!("shutting down server");
        self.signal.notify_waiters();

        for session in self.registry.snapshot() {
            session.close();
            // The session task also removes itself; whichever side gets
            // there second is a no-op.
            self.registry.remove(session.id());
        }

        self.state.store(STOPPED, Ordering::Release);
        true
    }

    /// Whether shutdown has been triggered.
    pub fn is_shutdown(&self) -> bool {
        self.state.load(Ordering::Acquire) != RUNNING
    }

    /// Resolve once shutdown has been triggered. Cancellation-safe.
    pub async fn triggered(&self) {
        loop {
            let notified = self.signal.notified();
            if self.is_shutdown() {
                return;
            }
            notified.await;
        }
    }
}

/// The text-line broadcast relay server.
///
/// Accepts connections, assigns each a unique `User<n>` identity, and
/// relays every line a peer sends to all registered peers.
pub struct Server {
    listener: TcpListener,
    registry: Registry,
    broadcaster: Broadcaster,
    shutdown: ShutdownHandle,
    next_id: AtomicU64,
}

impl Server {
    /// Bind the listening endpoint.
    ///
    /// Failure here is fatal to startup; there is no server without a
    /// listening endpoint.
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, RelayError> {
        let listener = TcpListener::bind(addr).await?;
        let registry = Registry::new();
        Ok(Self {
            broadcaster: Broadcaster::new(registry.clone()),
            shutdown: ShutdownHandle::new(registry.clone()),
            registry,
            listener,
            next_id: AtomicU64::new(0),
        })
    }

    /// The address the listening endpoint is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle to the live session registry.
    pub fn registry(&self) -> Registry {
        self.registry.clone()
    }

    /// Handle for triggering shutdown from outside the accept loop.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Run the accept loop until shutdown is triggered.
    ///
    /// Each accepted connection gets the next identity, a welcome line,
    /// a registry entry, and its own session task; the loop never waits on
    /// a session. Accept failures are logged and the loop continues.
    /// Returning drops the listener, which closes the listening endpoint.
    pub async fn run(self) {
        match self.listener.local_addr() {
            Ok(addr) => info!("accepting connections on {}", addr),
            Err(_) => info!("accepting connections"),
        }
        loop {
            tokio::select! {
                () = self.shutdown.triggered() => {
                    info!("accept loop stopping");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.accept(stream, peer),
                    Err(e) => warn!("failed to accept connection: {}", e),
                }
            }
        }
    }

    /// Register a newly accepted connection and start its session.
    fn accept(&self, stream: TcpStream, peer: SocketAddr) {
        // A connection can slip in while trigger() is snapshotting; it
        // must not outlive the shutdown.
        if self.shutdown.is_shutdown() {
            debug!("refusing connection from {} during shutdown", peer);
            return;
        }

        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        info!("{} connected from {}", id, peer);

        let (handle, outbound_rx) = SessionHandle::new(id);
        // Queued before registration so the welcome precedes any broadcast.
        let _ = handle.send(format!("Your username is: {id}"));
        self.registry.add(handle.clone());

        tokio::spawn(session::run(
            stream,
            handle,
            outbound_rx,
            self.registry.clone(),
            self.broadcaster.clone(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_fires_once() {
        let shutdown = ShutdownHandle::new(Registry::new());
        assert!(!shutdown.is_shutdown());
        assert!(shutdown.trigger());
        assert!(!shutdown.trigger());
        assert!(shutdown.is_shutdown());
    }

    #[tokio::test]
    async fn test_trigger_closes_and_drains_registry() {
        let registry = Registry::new();
        let (handle, _rx) = SessionHandle::new(SessionId(0));
        registry.add(handle.clone());

        let shutdown = ShutdownHandle::new(registry.clone());
        shutdown.trigger();

        assert!(handle.is_closed());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_trigger_after_self_close_is_clean() {
        let registry = Registry::new();
        let (handle, _rx) = SessionHandle::new(SessionId(0));
        registry.add(handle.clone());

        // Session closed itself and self-removed before shutdown.
        handle.close();
        registry.remove(handle.id());

        let shutdown = ShutdownHandle::new(registry.clone());
        assert!(shutdown.trigger());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_triggered_wakes_waiter() {
        use std::time::Duration;
        use tokio::time::timeout;

        let shutdown = ShutdownHandle::new(Registry::new());
        let waiter = shutdown.clone();
        let task = tokio::spawn(async move { waiter.triggered().await });
        shutdown.trigger();
        timeout(Duration::from_secs(1), task)
            .await
            .expect("waiter did not wake")
            .unwrap();
    }
}
