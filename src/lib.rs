//! feedmux - Multiplexed streaming-feed client.
//!
//! This library maintains a pool of persistent WebSocket connections to a
//! streaming event feed, spreads subscription commands across the pool by a
//! stable hash, and transparently restores a failed connection by replaying
//! every subscription that was live on it.
//!
//! # Architecture
//!
//! - [`StreamingPool`] owns a fixed array of slots, one connection each
//! - Commands route to a slot by `fx_hash(command) % parallelism`
//! - Each slot remembers its live activating commands, keyed by [`PairId`]
//! - On transport failure the slot's connection is replaced and its
//!   history replayed; subscriptions are neither lost nor duplicated
//! - All inbound events and runtime errors flow through the two callbacks
//!   supplied at construction
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use feedmux::{CandleInterval, Command, Result, StreamingPool, WsTransport};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let pool = StreamingPool::connect(
//!         Arc::new(WsTransport),
//!         url::Url::parse("wss://feed.example.com/streaming").unwrap(),
//!         "Bearer <token>",
//!         2,
//!         Arc::new(|event| println!("event: {event:?}")),
//!         Arc::new(|error| eprintln!("error: {error}")),
//!     )
//!     .await?;
//!
//!     pool.send_request(Command::CandleSubscribe {
//!         figi: "BBG000B9XRY4".into(),
//!         interval: CandleInterval::FiveMin,
//!     })
//!     .await;
//!
//!     // ... consume events ...
//!
//!     pool.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Command/event wire types and codec |
//! | [`transport`] | Connection pool, dispatcher, WebSocket transport |
//!
//! # Guarantees
//!
//! - **Deterministic routing**: identical commands always pick the same slot
//! - **Crash-consistent restore**: replay happens under the slot's lock,
//!   before any newer send on that slot
//! - **Single error surface**: construction is the only call that returns
//!   an error to the caller; everything at runtime goes to the error
//!   callback
//! - **No cross-slot ordering**: only sends on one connection are ordered

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for pool entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Wire protocol message types.
///
/// Commands out, events in, and the codec between them.
pub mod protocol;

/// Connection transport layer.
///
/// The pool, the shared dispatcher, and the WebSocket implementation.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ConnectionId, PairId};

// Protocol types
pub use protocol::{
    Candle, CandleInterval, Codec, Command, Event, InstrumentInfo, JsonCodec, Orderbook,
    ServiceError,
};

// Transport types
pub use transport::{
    Connection, ErrorCallback, EventCallback, StreamingPool, Transport, TransportListener,
    WsTransport,
};
