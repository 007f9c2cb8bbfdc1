//! Error types for the streaming pool.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use feedmux::{Result, StreamingPool};
//!
//! async fn example() -> Result<()> {
//!     let pool = StreamingPool::connect(/* ... */).await?;
//!     pool.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::Transport`] |
//! | Codec | [`Error::Encode`], [`Error::Decode`] |
//! | External | [`Error::Io`], [`Error::WebSocket`] |
//!
//! Only construction-time failures reach the caller synchronously; every
//! runtime error is delivered through the pool's error callback.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when pool construction input is invalid
    /// (zero parallelism, malformed endpoint URL).
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Opening a connection to the feed failed.
    ///
    /// Fatal during construction; reported through the error callback when
    /// a replacement connection cannot be opened during restore.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection is closed or the slot has no live connection.
    ///
    /// Returned when sending on a slot whose connection was lost and not
    /// replaced, or after the pool has been closed.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Connection-level transport failure.
    ///
    /// Reported by the transport's failure callback; triggers restore of
    /// the owning slot.
    #[error("Transport failure: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    // ========================================================================
    // Codec Errors
    // ========================================================================
    /// Command could not be encoded to a transport payload.
    ///
    /// Per-message and non-fatal; the command is dropped.
    #[error("Encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// Inbound payload could not be decoded to an event.
    ///
    /// Per-message and non-fatal; the payload is dropped and the
    /// connection is left untouched.
    #[error("Decode error: {0}")]
    Decode(#[source] serde_json::Error),

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a transport failure error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection-level error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionClosed
                | Self::Transport { .. }
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this is a per-message codec error.
    ///
    /// Codec errors drop a single message and never affect the connection.
    #[inline]
    #[must_use]
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Self::Encode(_) | Self::Decode(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
