//! Wire protocol message types.
//!
//! This module defines the message format exchanged with the streaming
//! feed: outbound subscription commands and inbound events, both JSON
//! objects tagged by an `event` field.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | [`Command`] | Local → Feed | Subscription control, keep-alive |
//! | [`Event`] | Feed → Local | Market data, service errors |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command enum and subscription pairing |
//! | `event` | Event enum and payload structs |
//! | `codec` | Codec trait and JSON implementation |

// ============================================================================
// Submodules
// ============================================================================

/// Command/event codec.
pub mod codec;

/// Outbound command definitions.
pub mod command;

/// Inbound event definitions.
pub mod event;

// ============================================================================
// Re-exports
// ============================================================================

pub use codec::{Codec, JsonCodec};
pub use command::{CandleInterval, Command};
pub use event::{Candle, Event, InstrumentInfo, Orderbook, ServiceError};
