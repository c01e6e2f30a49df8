//! Thread-safe session registry
//!
//! The registry is the only shared mutable state in the server. All access
//! goes through one mutex, and callers that need to iterate take a
//! [`Registry::snapshot`] first, so broadcast and shutdown never walk the
//! live map while a disconnecting session mutates it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::session::SessionHandle;
use crate::types::SessionId;

/// Collection of currently connected sessions, keyed by identity.
///
/// Cheap to clone; clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    sessions: Arc<Mutex<HashMap<SessionId, SessionHandle>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, SessionHandle>> {
        // A poisoned lock only means a panic elsewhere; the map itself is
        // still usable.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a session under its identity.
    pub fn add(&self, handle: SessionHandle) {
        let mut sessions = self.lock();
        sessions.insert(handle.id(), handle);
        debug!("registry now holds {} session(s)", sessions.len());
    }

    /// Remove a session by identity, returning whether it was present.
    ///
    /// Removing an absent identity is a no-op, so the self-removal path and
    /// a concurrent server shutdown can race freely.
    pub fn remove(&self, id: SessionId) -> bool {
        self.lock().remove(&id).is_some()
    }

    /// Whether a session with this identity is currently registered.
    pub fn contains(&self, id: SessionId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Point-in-time copy of the current members.
    ///
    /// Taken under the lock; callers iterate the copy while add/remove
    /// proceed on the live map.
    pub fn snapshot(&self) -> Vec<SessionHandle> {
        self.lock().values().cloned().collect()
    }

    /// Number of currently registered sessions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no sessions are registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: u64) -> SessionHandle {
        let (handle, _rx) = SessionHandle::new(SessionId(id));
        handle
    }

    #[test]
    fn test_add_and_remove() {
        let registry = Registry::new();
        registry.add(handle(0));
        registry.add(handle(1));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(SessionId(0)));

        assert!(registry.remove(SessionId(0)));
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains(SessionId(0)));
    }

    #[test]
    fn test_double_remove_is_noop() {
        let registry = Registry::new();
        registry.add(handle(5));
        assert!(registry.remove(SessionId(5)));
        assert!(!registry.remove(SessionId(5)));
        assert!(!registry.remove(SessionId(99)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_stable_under_mutation() {
        let registry = Registry::new();
        registry.add(handle(0));
        registry.add(handle(1));

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);

        // Mutating the live registry does not affect the copy.
        registry.remove(SessionId(1));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_add_replaces_same_identity() {
        let registry = Registry::new();
        registry.add(handle(3));
        registry.add(handle(3));
        assert_eq!(registry.len(), 1);
    }
}
