//! Connection transport layer.
//!
//! This module owns everything between a [`Command`](crate::protocol::Command)
//! leaving the caller and an [`Event`](crate::protocol::Event) coming back:
//! the pooled connections, the shared dispatcher, and the WebSocket
//! implementation behind the [`Transport`] trait.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   send_request    ┌───────────────────────────┐
//! │    Caller    │ ────────────────► │       StreamingPool       │
//! │              │                   │  Slot 0 ─ Connection ──┐  │
//! │  on_event ◄──┼── EventDispatcher │  Slot 1 ─ Connection ──┼──┼──► feed
//! │  on_error ◄──┼──      ▲          │  Slot N ─ Connection ──┘  │
//! └──────────────┘        └──────────┴── inbound frames ─────────┘
//! ```
//!
//! # Failure Recovery
//!
//! A connection failure reaches the dispatcher, which restores the owning
//! slot: a fresh connection replaces the failed one and the slot's
//! remembered subscriptions are replayed before any newer traffic may use
//! the slot.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Transport traits and the WebSocket implementation |
//! | `dispatcher` | Shared listener: decode, deliver, restore |
//! | `pool` | Slot array, hash routing, history replay |

// ============================================================================
// Submodules
// ============================================================================

/// Transport traits and the WebSocket implementation.
pub mod connection;

/// Shared event dispatcher.
pub mod dispatcher;

/// Connection pool with hash routing and subscription replay.
pub mod pool;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, Transport, TransportListener, WsTransport};
pub use dispatcher::{ErrorCallback, EventCallback};
pub use pool::StreamingPool;
