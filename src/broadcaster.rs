//! Broadcast fan-out
//!
//! Distributes one sender's line to every session in the registry's
//! current snapshot.

use tracing::{debug, trace};

use crate::registry::Registry;
use crate::types::SessionId;

/// Fans a sender's lines out to all registered sessions.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Registry,
}

impl Broadcaster {
    /// Create a broadcaster over the given registry.
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Send `<sender>: <line>` to every member of the current snapshot.
    ///
    /// The sender is not excluded, so it sees its own line echoed back.
    /// A member that closed between the snapshot and the send just drops
    /// the line; that is not an error.
    pub fn broadcast(&self, sender: SessionId, line: &str) {
        let message = format!("{sender}: {line}");
        for peer in self.registry.snapshot() {
            trace!("relaying line from {} to {}", sender, peer.id());
            if peer.send(message.clone()).is_err() {
                debug!("dropped line for closed session {}", peer.id());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionHandle;
    use tokio::sync::mpsc;

    fn register(registry: &Registry, id: u64) -> mpsc::UnboundedReceiver<String> {
        let (handle, rx) = SessionHandle::new(SessionId(id));
        registry.add(handle);
        rx
    }

    #[tokio::test]
    async fn test_fan_out_reaches_every_peer_including_sender() {
        let registry = Registry::new();
        let mut receivers = vec![
            register(&registry, 0),
            register(&registry, 1),
            register(&registry, 2),
        ];

        let broadcaster = Broadcaster::new(registry);
        broadcaster.broadcast(SessionId(0), "hi");

        for rx in &mut receivers {
            assert_eq!(rx.recv().await.unwrap(), "User0: hi");
            // Exactly once.
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn test_closed_peer_is_skipped_without_error() {
        let registry = Registry::new();
        let mut alive = register(&registry, 0);
        let _gone = register(&registry, 1);
        for peer in registry.snapshot() {
            if peer.id() == SessionId(1) {
                peer.close();
            }
        }

        let broadcaster = Broadcaster::new(registry);
        broadcaster.broadcast(SessionId(0), "still here");

        assert_eq!(alive.recv().await.unwrap(), "User0: still here");
    }

    #[tokio::test]
    async fn test_broadcast_to_empty_registry_is_noop() {
        let broadcaster = Broadcaster::new(Registry::new());
        broadcaster.broadcast(SessionId(0), "anyone?");
    }
}
