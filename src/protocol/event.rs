//! Inbound event definitions.
//!
//! Events are notifications pushed by the feed on an open connection.
//! The envelope tags the payload by the `event` field:
//!
//! ```json
//! { "event": "candle", "payload": { "figi": "...", "interval": "5min", ... } }
//! ```
//!
//! # Event Types
//!
//! | Event | Payload |
//! |-------|---------|
//! | `candle` | [`Candle`] |
//! | `orderbook` | [`Orderbook`] |
//! | `instrument_info` | [`InstrumentInfo`] |
//! | `error` | [`ServiceError`] |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use super::CandleInterval;

// ============================================================================
// Event
// ============================================================================

/// An event pushed by the feed.
///
/// Opaque to the pool beyond delivery: the dispatcher decodes the envelope
/// and hands the typed event to the caller's event callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum Event {
    /// Candle update.
    #[serde(rename = "candle")]
    Candle(Candle),

    /// Order book snapshot.
    #[serde(rename = "orderbook")]
    Orderbook(Orderbook),

    /// Instrument status update.
    #[serde(rename = "instrument_info")]
    InstrumentInfo(InstrumentInfo),

    /// Service-side error for a previously sent command.
    #[serde(rename = "error")]
    Error(ServiceError),
}

// ============================================================================
// Payloads
// ============================================================================

/// Candle payload for the `candle` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Instrument FIGI.
    pub figi: String,

    /// Aggregation interval.
    pub interval: CandleInterval,

    /// Open price.
    #[serde(rename = "o")]
    pub open: f64,

    /// Close price.
    #[serde(rename = "c")]
    pub close: f64,

    /// High price.
    #[serde(rename = "h")]
    pub high: f64,

    /// Low price.
    #[serde(rename = "l")]
    pub low: f64,

    /// Traded volume.
    #[serde(rename = "v")]
    pub volume: f64,

    /// Candle timestamp (RFC 3339).
    pub time: String,
}

/// Order book payload for the `orderbook` event.
///
/// Bids and asks are `[price, quantity]` levels, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orderbook {
    /// Instrument FIGI.
    pub figi: String,

    /// Snapshot depth.
    pub depth: u32,

    /// Bid levels, best first.
    pub bids: Vec<[f64; 2]>,

    /// Ask levels, best first.
    pub asks: Vec<[f64; 2]>,
}

/// Instrument status payload for the `instrument_info` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentInfo {
    /// Instrument FIGI.
    pub figi: String,

    /// Trading status (e.g. `normal_trading`).
    pub trade_status: String,

    /// Minimum price increment.
    pub min_price_increment: f64,

    /// Lot size.
    pub lot: u32,
}

/// Error payload for the `error` event.
///
/// Sent by the feed when a command was malformed or rejected; carries the
/// offending request id when the feed can attribute it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceError {
    /// Id of the rejected request, if attributable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Human-readable error description.
    pub error: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_event_parsing() {
        let json_str = r#"{
            "event": "candle",
            "payload": {
                "figi": "BBG000B9XRY4",
                "interval": "5min",
                "o": 100.5,
                "c": 101.0,
                "h": 101.5,
                "l": 100.0,
                "v": 1200.0,
                "time": "2019-08-07T15:35:00Z"
            }
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event {
            Event::Candle(candle) => {
                assert_eq!(candle.figi, "BBG000B9XRY4");
                assert_eq!(candle.interval, CandleInterval::FiveMin);
                assert_eq!(candle.close, 101.0);
            }
            _ => panic!("unexpected event type"),
        }
    }

    #[test]
    fn test_orderbook_event_parsing() {
        let json_str = r#"{
            "event": "orderbook",
            "payload": {
                "figi": "BBG000B9XRY4",
                "depth": 2,
                "bids": [[100.0, 50.0], [99.5, 10.0]],
                "asks": [[100.5, 20.0], [101.0, 5.0]]
            }
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event {
            Event::Orderbook(orderbook) => {
                assert_eq!(orderbook.depth, 2);
                assert_eq!(orderbook.bids[0], [100.0, 50.0]);
                assert_eq!(orderbook.asks.len(), 2);
            }
            _ => panic!("unexpected event type"),
        }
    }

    #[test]
    fn test_service_error_without_request_id() {
        let json_str = r#"{
            "event": "error",
            "payload": { "error": "Subscription limit exceeded" }
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event {
            Event::Error(err) => {
                assert_eq!(err.request_id, None);
                assert_eq!(err.error, "Subscription limit exceeded");
            }
            _ => panic!("unexpected event type"),
        }
    }

    #[test]
    fn test_event_round_trip() {
        let event = Event::InstrumentInfo(InstrumentInfo {
            figi: "BBG000B9XRY4".into(),
            trade_status: "normal_trading".into(),
            min_price_increment: 0.01,
            lot: 10,
        });

        let json = serde_json::to_string(&event).expect("serialize");
        let back: Event = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(event, back);
    }
}
