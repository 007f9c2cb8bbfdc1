//! Outbound command definitions.
//!
//! Commands follow the feed's `channel:verb` event naming and serialize as
//! flat JSON objects tagged by the `event` field:
//!
//! ```json
//! { "event": "candle:subscribe", "figi": "BBG000B9XRY4", "interval": "5min" }
//! ```
//!
//! # Channels
//!
//! | Channel | Activating | Deactivating | Key fields |
//! |---------|------------|--------------|------------|
//! | `candle` | `candle:subscribe` | `candle:unsubscribe` | figi, interval |
//! | `orderbook` | `orderbook:subscribe` | `orderbook:unsubscribe` | figi, depth |
//! | `instrument_info` | `instrument_info:subscribe` | `instrument_info:unsubscribe` | figi |
//!
//! `ping` is a plain keep-alive: it has no pair id and is never remembered
//! for replay.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifiers::PairId;

// ============================================================================
// CandleInterval
// ============================================================================

/// Candle aggregation interval for the `candle` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandleInterval {
    /// One minute.
    #[serde(rename = "1min")]
    OneMin,
    /// Two minutes.
    #[serde(rename = "2min")]
    TwoMin,
    /// Three minutes.
    #[serde(rename = "3min")]
    ThreeMin,
    /// Five minutes.
    #[serde(rename = "5min")]
    FiveMin,
    /// Ten minutes.
    #[serde(rename = "10min")]
    TenMin,
    /// Fifteen minutes.
    #[serde(rename = "15min")]
    FifteenMin,
    /// Thirty minutes.
    #[serde(rename = "30min")]
    ThirtyMin,
    /// One hour.
    #[serde(rename = "hour")]
    Hour,
    /// One day.
    #[serde(rename = "day")]
    Day,
    /// One week.
    #[serde(rename = "week")]
    Week,
    /// One month.
    #[serde(rename = "month")]
    Month,
}

impl CandleInterval {
    /// Returns the wire name of the interval.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMin => "1min",
            Self::TwoMin => "2min",
            Self::ThreeMin => "3min",
            Self::FiveMin => "5min",
            Self::TenMin => "10min",
            Self::FifteenMin => "15min",
            Self::ThirtyMin => "30min",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for CandleInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Command
// ============================================================================

/// An outbound command to the feed.
///
/// Subscribe variants are *activating*: they carry a [`PairId`] and are
/// remembered in their slot's history so a restored connection can replay
/// them. Unsubscribe variants are *deactivating*: they share the pair id of
/// their subscribe counterpart and clear it from history, but the message
/// itself is still sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Command {
    /// Subscribe to candles for an instrument.
    #[serde(rename = "candle:subscribe")]
    CandleSubscribe {
        /// Instrument FIGI.
        figi: String,
        /// Aggregation interval.
        interval: CandleInterval,
    },

    /// Unsubscribe from candles for an instrument.
    #[serde(rename = "candle:unsubscribe")]
    CandleUnsubscribe {
        /// Instrument FIGI.
        figi: String,
        /// Aggregation interval.
        interval: CandleInterval,
    },

    /// Subscribe to the order book for an instrument.
    #[serde(rename = "orderbook:subscribe")]
    OrderbookSubscribe {
        /// Instrument FIGI.
        figi: String,
        /// Order book depth.
        depth: u32,
    },

    /// Unsubscribe from the order book for an instrument.
    #[serde(rename = "orderbook:unsubscribe")]
    OrderbookUnsubscribe {
        /// Instrument FIGI.
        figi: String,
        /// Order book depth.
        depth: u32,
    },

    /// Subscribe to instrument status and limits.
    #[serde(rename = "instrument_info:subscribe")]
    InstrumentInfoSubscribe {
        /// Instrument FIGI.
        figi: String,
    },

    /// Unsubscribe from instrument status and limits.
    #[serde(rename = "instrument_info:unsubscribe")]
    InstrumentInfoUnsubscribe {
        /// Instrument FIGI.
        figi: String,
    },

    /// Keep-alive ping.
    #[serde(rename = "ping")]
    Ping,
}

impl Command {
    /// Returns the pair id linking this command to its on/off counterpart.
    ///
    /// `None` for commands that are not part of a subscription pair
    /// ([`Command::Ping`]); those are never stored in history.
    #[must_use]
    pub fn pair_id(&self) -> Option<PairId> {
        match self {
            Self::CandleSubscribe { figi, interval }
            | Self::CandleUnsubscribe { figi, interval } => {
                Some(PairId::new("candle", format!("{figi}:{interval}")))
            }
            Self::OrderbookSubscribe { figi, depth }
            | Self::OrderbookUnsubscribe { figi, depth } => {
                Some(PairId::new("orderbook", format!("{figi}:{depth}")))
            }
            Self::InstrumentInfoSubscribe { figi } | Self::InstrumentInfoUnsubscribe { figi } => {
                Some(PairId::new("instrument_info", figi))
            }
            Self::Ping => None,
        }
    }

    /// Returns `true` if this command turns a subscription on.
    ///
    /// Only activating commands survive in a slot's history for replay.
    #[inline]
    #[must_use]
    pub const fn is_activating(&self) -> bool {
        matches!(
            self,
            Self::CandleSubscribe { .. }
                | Self::OrderbookSubscribe { .. }
                | Self::InstrumentInfoSubscribe { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_subscribe_wire_format() {
        let command = Command::CandleSubscribe {
            figi: "BBG000B9XRY4".into(),
            interval: CandleInterval::FiveMin,
        };

        let json = serde_json::to_string(&command).expect("serialize");
        assert!(json.contains(r#""event":"candle:subscribe""#));
        assert!(json.contains(r#""figi":"BBG000B9XRY4""#));
        assert!(json.contains(r#""interval":"5min""#));
    }

    #[test]
    fn test_ping_wire_format() {
        let json = serde_json::to_string(&Command::Ping).expect("serialize");
        assert_eq!(json, r#"{"event":"ping"}"#);
    }

    #[test]
    fn test_subscribe_unsubscribe_share_pair_id() {
        let on = Command::OrderbookSubscribe {
            figi: "BBG000B9XRY4".into(),
            depth: 20,
        };
        let off = Command::OrderbookUnsubscribe {
            figi: "BBG000B9XRY4".into(),
            depth: 20,
        };

        assert_eq!(on.pair_id(), off.pair_id());
        assert!(on.is_activating());
        assert!(!off.is_activating());
    }

    #[test]
    fn test_distinct_intervals_distinct_pair_ids() {
        let one = Command::CandleSubscribe {
            figi: "BBG000B9XRY4".into(),
            interval: CandleInterval::OneMin,
        };
        let five = Command::CandleSubscribe {
            figi: "BBG000B9XRY4".into(),
            interval: CandleInterval::FiveMin,
        };

        assert_ne!(one.pair_id(), five.pair_id());
    }

    #[test]
    fn test_ping_has_no_pair_id() {
        assert_eq!(Command::Ping.pair_id(), None);
        assert!(!Command::Ping.is_activating());
    }

    #[test]
    fn test_command_round_trip() {
        let command = Command::InstrumentInfoSubscribe {
            figi: "BBG000B9XRY4".into(),
        };
        let json = serde_json::to_string(&command).expect("serialize");
        let back: Command = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(command, back);
    }
}
