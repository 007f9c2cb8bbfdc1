//! Connection pool with hash routing and subscription replay.
//!
//! The pool owns a fixed array of slots, one connection each. Outbound
//! commands are routed to a slot by a stable hash of the command; each
//! slot remembers the activating commands currently live on it so a
//! replacement connection can be brought back to the same subscription
//! state after a transport failure.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               StreamingPool                  │
//! │  ┌────────────────────────────────────────┐  │
//! │  │ Slot 0: Connection + history (PairId)  │  │
//! │  │ Slot 1: Connection + history (PairId)  │  │
//! │  │ Slot 2: Connection + history (PairId)  │  │
//! │  └────────────────────────────────────────┘  │
//! │        route = fx_hash(command) % N          │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Restore
//!
//! A failed connection is resolved back to its slot by [`ConnectionId`],
//! replaced with a fresh connection to the same endpoint, and every
//! remembered activating command is re-sent on it. The slot's lock is held
//! across the swap and the replay, so a concurrent `send_request` for the
//! same slot cannot slip in ahead of the replayed history.

// ============================================================================
// Imports
// ============================================================================

use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rustc_hash::{FxHashMap, FxHasher};
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::{ConnectionId, PairId};
use crate::protocol::{Codec, Command, JsonCodec};

use super::connection::{Connection, Transport, TransportListener};
use super::dispatcher::{ErrorCallback, EventCallback, EventDispatcher};

// ============================================================================
// Constants
// ============================================================================

/// WebSocket normal-closure code used at pool shutdown.
const NORMAL_CLOSURE: u16 = 1000;

// ============================================================================
// Routing
// ============================================================================

/// Routes a command to a slot index.
///
/// Purely data-derived: `FxHasher` is unseeded, so identical commands
/// always land on the same slot, across calls and across runs. The hash
/// output is an unsigned 64-bit value reduced with `% parallelism`, so the
/// index is always in range and never negative.
pub(crate) fn route_index(command: &Command, parallelism: usize) -> usize {
    let mut hasher = FxHasher::default();
    command.hash(&mut hasher);
    (hasher.finish() % parallelism as u64) as usize
}

// ============================================================================
// Slot
// ============================================================================

/// One pooled connection plus its subscription history.
///
/// `connection` is `None` only after a restore failed to open a
/// replacement; the history is kept either way, since it is the
/// authoritative memory of what must be on.
struct Slot {
    /// The slot's connection, replaced (not mutated) on restore.
    connection: Option<Box<dyn Connection>>,
    /// Activating commands currently live on this connection.
    ///
    /// Keyed by pair id: at most one activating command per pair, and
    /// overwrite-on-reactivate and clear-on-deactivate are O(1).
    history: FxHashMap<PairId, Command>,
}

impl Slot {
    fn new(connection: Box<dyn Connection>) -> Self {
        Self {
            connection: Some(connection),
            history: FxHashMap::default(),
        }
    }
}

// ============================================================================
// PoolInner
// ============================================================================

/// Shared pool state behind the [`StreamingPool`] handle.
pub(crate) struct PoolInner {
    /// Transport used for initial connections and replacements.
    transport: Arc<dyn Transport>,
    /// Feed endpoint, shared by every connection.
    endpoint: Url,
    /// `Authorization` header value.
    auth_token: String,
    /// Command/event codec.
    codec: Arc<dyn Codec>,
    /// Fixed-length slot array; the index is the slot's identity.
    slots: Vec<Mutex<Slot>>,
    /// Shared listener installed on every connection.
    dispatcher: Arc<EventDispatcher>,
    /// Caller's error callback.
    on_error: ErrorCallback,
    /// Set by `close`; failure callbacks arriving afterwards are no-ops.
    closed: AtomicBool,
}

impl PoolInner {
    /// Returns `true` once the pool has been closed.
    #[inline]
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Encodes, books, and sends one command.
    async fn try_send(&self, command: Command) -> Result<()> {
        let index = route_index(&command, self.slots.len());

        // Encode before touching history so a malformed command leaves the
        // slot's bookkeeping untouched.
        let payload = self.codec.encode(&command)?;

        let mut slot = self.slots[index].lock().await;

        // The newest command for a pair always wins in history: a
        // re-activation replaces the stale entry, a deactivation clears it
        // (the unsubscribe message itself is still sent below).
        if let Some(pair_id) = command.pair_id() {
            slot.history.remove(&pair_id);
            if command.is_activating() {
                slot.history.insert(pair_id, command);
            }
        }

        trace!(slot = index, "Command routed");

        match slot.connection.as_ref() {
            Some(connection) => connection.send(payload),
            None => Err(Error::ConnectionClosed),
        }
    }

    /// Replaces a failed connection and replays its slot's history.
    ///
    /// Spawned by the dispatcher's failure callback. The owning slot is
    /// found by connection identity; only then is the failure surfaced
    /// through the error callback. A failure for a connection no slot
    /// owns (already replaced, or closed) is stale: logged, not surfaced.
    pub(crate) async fn restore(self: Arc<Self>, failed: ConnectionId, error: Error) {
        let mut error = Some(error);

        for (index, slot_lock) in self.slots.iter().enumerate() {
            let mut slot = slot_lock.lock().await;

            let owns = slot
                .connection
                .as_ref()
                .is_some_and(|connection| connection.id() == failed);
            if !owns {
                continue;
            }

            if self.is_closed() {
                return;
            }

            if let Some(error) = error.take() {
                warn!(slot = index, connection_id = %failed, error = %error, "Transport failure, restoring slot");
                (self.on_error)(error);
            }

            let listener: Arc<dyn TransportListener> = self.dispatcher.clone();
            let replacement = self
                .transport
                .open(&self.endpoint, &self.auth_token, listener)
                .await;

            match replacement {
                Ok(connection) => {
                    debug!(
                        slot = index,
                        old = %failed,
                        new = %connection.id(),
                        entries = slot.history.len(),
                        "Connection replaced, replaying history"
                    );

                    // Best-effort replay: a bad entry is reported and
                    // skipped, the rest still go out.
                    for command in slot.history.values() {
                        let payload = match self.codec.encode(command) {
                            Ok(payload) => payload,
                            Err(e) => {
                                (self.on_error)(e);
                                continue;
                            }
                        };
                        if let Err(e) = connection.send(payload) {
                            (self.on_error)(e);
                        }
                    }

                    slot.connection = Some(connection);
                }
                Err(e) => {
                    // Single-attempt recovery: the slot stays connectionless.
                    warn!(slot = index, error = %e, "Replacement connection failed");
                    slot.connection = None;
                    (self.on_error)(e);
                }
            }

            return;
        }

        debug!(connection_id = %failed, "Stale failure for unknown connection, ignored");
    }
}

// ============================================================================
// StreamingPool
// ============================================================================

/// Pool of persistent feed connections with subscription replay.
///
/// Cheap to clone; all clones share the same slots.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use feedmux::{Command, CandleInterval, StreamingPool, WsTransport};
///
/// let pool = StreamingPool::connect(
///     Arc::new(WsTransport),
///     url::Url::parse("wss://feed.example.com/streaming")?,
///     "Bearer <token>",
///     2,
///     Arc::new(|event| println!("{event:?}")),
///     Arc::new(|error| eprintln!("{error}")),
/// )
/// .await?;
///
/// pool.send_request(Command::CandleSubscribe {
///     figi: "BBG000B9XRY4".into(),
///     interval: CandleInterval::FiveMin,
/// })
/// .await;
/// ```
#[derive(Clone)]
pub struct StreamingPool {
    inner: Arc<PoolInner>,
}

// ============================================================================
// StreamingPool - Constructor
// ============================================================================

impl StreamingPool {
    /// Opens a pool of `parallelism` connections with the JSON codec.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if `parallelism` is zero
    /// - [`Error::Connection`] if any connection cannot be opened; no
    ///   partial pool survives, connections opened so far are closed
    pub async fn connect(
        transport: Arc<dyn Transport>,
        endpoint: Url,
        auth_token: impl Into<String>,
        parallelism: usize,
        on_event: EventCallback,
        on_error: ErrorCallback,
    ) -> Result<Self> {
        Self::connect_with_codec(
            transport,
            endpoint,
            auth_token,
            parallelism,
            Arc::new(JsonCodec),
            on_event,
            on_error,
        )
        .await
    }

    /// Opens a pool with a custom codec.
    ///
    /// # Errors
    ///
    /// Same as [`StreamingPool::connect`].
    pub async fn connect_with_codec(
        transport: Arc<dyn Transport>,
        endpoint: Url,
        auth_token: impl Into<String>,
        parallelism: usize,
        codec: Arc<dyn Codec>,
        on_event: EventCallback,
        on_error: ErrorCallback,
    ) -> Result<Self> {
        if parallelism == 0 {
            return Err(Error::config("parallelism must be at least 1"));
        }

        let auth_token = auth_token.into();
        let dispatcher = Arc::new(EventDispatcher::new(
            Arc::clone(&codec),
            on_event,
            Arc::clone(&on_error),
        ));

        let mut connections: Vec<Box<dyn Connection>> = Vec::with_capacity(parallelism);
        for _ in 0..parallelism {
            let listener: Arc<dyn TransportListener> = dispatcher.clone();
            match transport.open(&endpoint, &auth_token, listener).await {
                Ok(connection) => connections.push(connection),
                Err(e) => {
                    // No silently partial pool: roll back what was opened.
                    for connection in &connections {
                        connection.close(NORMAL_CLOSURE, "construction failed");
                    }
                    return Err(e);
                }
            }
        }

        let inner = Arc::new(PoolInner {
            transport,
            endpoint,
            auth_token,
            codec,
            slots: connections.into_iter().map(|c| Mutex::new(Slot::new(c))).collect(),
            dispatcher: Arc::clone(&dispatcher),
            on_error,
            closed: AtomicBool::new(false),
        });
        dispatcher.attach(&inner);

        info!(parallelism, endpoint = %inner.endpoint, "Streaming pool connected");

        Ok(Self { inner })
    }
}

// ============================================================================
// StreamingPool - Public API
// ============================================================================

impl StreamingPool {
    /// Returns the number of slots in the pool.
    #[inline]
    #[must_use]
    pub fn parallelism(&self) -> usize {
        self.inner.slots.len()
    }

    /// Sends a command on its hash-selected slot.
    ///
    /// If the command is part of a subscription pair, the slot's history is
    /// updated first: the pair's previous entry is dropped and an
    /// activating command is inserted, so restore replays exactly the
    /// subscriptions that are on.
    ///
    /// Runtime errors (encode failure, dead slot, failed send) surface
    /// through the error callback, never to the caller.
    pub async fn send_request(&self, command: Command) {
        if let Err(e) = self.inner.try_send(command).await {
            (self.inner.on_error)(e);
        }
    }

    /// Closes every connection with a normal-closure code.
    ///
    /// Idempotent. Transport failures reported after close do not open
    /// replacement connections.
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        for slot_lock in &self.inner.slots {
            let mut slot = slot_lock.lock().await;
            if let Some(connection) = slot.connection.take() {
                connection.close(NORMAL_CLOSURE, "shutdown");
            }
        }

        info!("Streaming pool closed");
    }
}

// ============================================================================
// Tests
// ============================================================================
