//! Command/event codec.
//!
//! The pool treats encoding as a collaborator: commands become transport
//! payloads on the way out, payloads become [`Event`]s on the way in.
//! [`JsonCodec`] is the production implementation; tests swap in the same
//! trait to observe exact payloads.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

use super::{Command, Event};

// ============================================================================
// Codec Trait
// ============================================================================

/// Serializes commands to transport payloads and deserializes payloads
/// to events.
pub trait Codec: Send + Sync {
    /// Encodes a command to a transport payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the command cannot be serialized.
    fn encode(&self, command: &Command) -> Result<String>;

    /// Decodes a transport payload to an event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the payload is malformed.
    fn decode(&self, payload: &str) -> Result<Event>;
}

// ============================================================================
// JsonCodec
// ============================================================================

/// JSON codec matching the feed's wire format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, command: &Command) -> Result<String> {
        serde_json::to_string(command).map_err(Error::Encode)
    }

    fn decode(&self, payload: &str) -> Result<Event> {
        serde_json::from_str(payload).map_err(Error::Decode)
    }
}

// ============================================================================
// Tests
// ============================================================================
