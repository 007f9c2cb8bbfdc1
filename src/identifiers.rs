//! Type-safe identifiers for pool entities.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`ConnectionId`] | Identity of one pooled connection; resolves a failure back to its slot |
//! | [`PairId`] | Links an activating and deactivating command for the same subscription |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// ConnectionId
// ============================================================================

/// Process-wide counter for [`ConnectionId::next`].
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for one pooled connection.
///
/// A fresh id is assigned every time a connection is opened, including
/// replacements created during restore. The pool resolves a transport
/// failure back to the owning slot by comparing ids, so a stale failure
/// for an already-replaced connection no longer matches any slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Returns the next unique connection id.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

// ============================================================================
// PairId
// ============================================================================

/// Key linking an activating and deactivating command for the same
/// logical subscription.
///
/// `candle:subscribe` and `candle:unsubscribe` for the same instrument and
/// interval produce the same `PairId`; a slot's history holds at most one
/// activating command per pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairId(String);

impl PairId {
    /// Creates a pair id from a subscription channel and its key fields.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let id = PairId::new("candle", "BBG000B9XRY4:5min");
    /// assert_eq!(id.as_str(), "candle/BBG000B9XRY4:5min");
    /// ```
    #[inline]
    #[must_use]
    pub fn new(channel: &str, key: impl AsRef<str>) -> Self {
        Self(format!("{channel}/{}", key.as_ref()))
    }

    /// Returns the pair id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_unique() {
        let a = ConnectionId::next();
        let b = ConnectionId::next();
        assert_ne!(a, b);
        assert!(b.as_u64() > a.as_u64());
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::next();
        assert_eq!(id.to_string(), format!("conn-{}", id.as_u64()));
    }

    #[test]
    fn test_pair_id_equality() {
        let subscribe = PairId::new("candle", "BBG000B9XRY4:5min");
        let unsubscribe = PairId::new("candle", "BBG000B9XRY4:5min");
        let other = PairId::new("candle", "BBG000B9XRY4:1min");

        assert_eq!(subscribe, unsubscribe);
        assert_ne!(subscribe, other);
    }

    #[test]
    fn test_pair_id_display() {
        let id = PairId::new("orderbook", "BBG000B9XRY4:20");
        assert_eq!(id.to_string(), "orderbook/BBG000B9XRY4:20");
    }
}
