//! Basic type definitions for the relay
//!
//! Provides the `SessionId` newtype, the unique identity assigned to each
//! connected peer.

/// Unique session identifier (newtype pattern)
///
/// Wraps the server's monotonically increasing connection counter. An
/// identity is never reused for the lifetime of one server process, even
/// after its peer disconnects.
///
/// The `Display` form is the peer-visible username, `User<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "User{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_username() {
        assert_eq!(SessionId(0).to_string(), "User0");
        assert_eq!(SessionId(42).to_string(), "User42");
    }

    #[test]
    fn test_distinct_counters_are_distinct_ids() {
        assert_ne!(SessionId(0), SessionId(1));
        assert_eq!(SessionId(7), SessionId(7));
    }
}
