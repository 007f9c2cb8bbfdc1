//! Shared event dispatcher.
//!
//! One [`EventDispatcher`] instance is the listener for every connection in
//! a pool. It decodes inbound payloads into events for the caller, reports
//! errors through the single error callback, and turns transport failures
//! into slot restores.
//!
//! The dispatcher itself is stateless apart from its callbacks and a weak
//! back-reference to the pool; it never needs to know which slot a message
//! came from to deliver it.

// ============================================================================
// Imports
// ============================================================================

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::Error;
use crate::identifiers::ConnectionId;
use crate::protocol::{Codec, Event};

use super::connection::TransportListener;
use super::pool::PoolInner;

// ============================================================================
// Callback Types
// ============================================================================

/// Event callback type.
///
/// Called for each event decoded from an inbound payload.
pub type EventCallback = Arc<dyn Fn(Event) + Send + Sync>;

/// Error callback type.
///
/// The single sink for every runtime error: codec failures, transport
/// failures, and failed restores.
pub type ErrorCallback = Arc<dyn Fn(Error) + Send + Sync>;

// ============================================================================
// EventDispatcher
// ============================================================================

/// Listener shared by all pooled connections.
pub(crate) struct EventDispatcher {
    /// Codec for inbound payloads.
    codec: Arc<dyn Codec>,
    /// Caller's event callback.
    on_event: EventCallback,
    /// Caller's error callback.
    on_error: ErrorCallback,
    /// Back-reference to the pool, set once construction completes.
    ///
    /// Weak so the dispatcher (held by every connection) does not keep the
    /// pool alive after the caller drops it.
    pool: Mutex<Weak<PoolInner>>,
}

impl EventDispatcher {
    /// Creates a dispatcher with no pool attached yet.
    pub(crate) fn new(
        codec: Arc<dyn Codec>,
        on_event: EventCallback,
        on_error: ErrorCallback,
    ) -> Self {
        Self {
            codec,
            on_event,
            on_error,
            pool: Mutex::new(Weak::new()),
        }
    }

    /// Attaches the pool once its slots exist.
    ///
    /// Failures arriving before attach are treated as stale and dropped.
    pub(crate) fn attach(&self, pool: &Arc<PoolInner>) {
        *self.pool.lock() = Arc::downgrade(pool);
    }
}

impl TransportListener for EventDispatcher {
    fn on_message(&self, connection_id: ConnectionId, payload: &str) {
        match self.codec.decode(payload) {
            Ok(event) => (self.on_event)(event),
            Err(e) => {
                // Malformed payload drops the message, never the connection.
                warn!(%connection_id, error = %e, "Failed to decode inbound payload");
                (self.on_error)(e);
            }
        }
    }

    fn on_failure(&self, connection_id: ConnectionId, error: Error) {
        let pool = self.pool.lock().upgrade();

        let Some(pool) = pool else {
            debug!(%connection_id, "Failure for detached pool, ignored");
            return;
        };

        if pool.is_closed() {
            debug!(%connection_id, "Failure after close, ignored");
            return;
        }

        debug!(%connection_id, error = %error, "Transport failure reported");

        // The pool surfaces the failure once it has confirmed a slot still
        // owns this connection; a stale notification for an already
        // replaced connection is logged there and never reaches the caller.
        tokio::spawn(pool.restore(connection_id, error));
    }
}

// ============================================================================
// Tests
// ============================================================================
