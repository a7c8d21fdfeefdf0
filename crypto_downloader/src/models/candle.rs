//! Canonical in-memory representation of one OHLCV candle.
//!
//! [`CandleRecord`] is what every [`DataProvider`](crate::providers::DataProvider)
//! returns and what the local store persists, one CSV row per record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::timeframe::Timeframe;

/// Column order of a stored per-timeframe file.
pub const CANDLE_COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

/// Column order of a combined multi-timeframe file.
pub const COMBINED_COLUMNS: [&str; 7] = [
    "timestamp",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "timeframe",
];

/// A single OHLCV observation.
///
/// The field order matches [`CANDLE_COLUMNS`]; prices and volume keep their
/// exact decimal form through a store round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandleRecord {
    /// Open time of the candle (UTC).
    pub timestamp: DateTime<Utc>,

    #[serde(with = "rust_decimal::serde::str")]
    pub open: Decimal,

    #[serde(with = "rust_decimal::serde::str")]
    pub high: Decimal,

    #[serde(with = "rust_decimal::serde::str")]
    pub low: Decimal,

    #[serde(with = "rust_decimal::serde::str")]
    pub close: Decimal,

    /// Base-asset volume traded during the interval.
    #[serde(with = "rust_decimal::serde::str")]
    pub volume: Decimal,
}

impl CandleRecord {
    /// Whether the prices describe a possible candle: `low <= open, close <= high`
    /// and a non-negative volume. The store does not enforce this.
    pub fn is_well_formed(&self) -> bool {
        self.low <= self.high
            && self.low <= self.open
            && self.open <= self.high
            && self.low <= self.close
            && self.close <= self.high
            && !self.volume.is_sign_negative()
    }
}

/// A candle tagged with the timeframe of the file it came from.
///
/// Rows of a combined file are grouped by timeframe in the order the caller
/// asked for, so this type deliberately has no ordering of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedRecord {
    pub timestamp: DateTime<Utc>,

    #[serde(with = "rust_decimal::serde::str")]
    pub open: Decimal,

    #[serde(with = "rust_decimal::serde::str")]
    pub high: Decimal,

    #[serde(with = "rust_decimal::serde::str")]
    pub low: Decimal,

    #[serde(with = "rust_decimal::serde::str")]
    pub close: Decimal,

    #[serde(with = "rust_decimal::serde::str")]
    pub volume: Decimal,

    pub timeframe: Timeframe,
}

impl CombinedRecord {
    pub fn new(candle: CandleRecord, timeframe: Timeframe) -> Self {
        Self {
            timestamp: candle.timestamp,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
            timeframe,
        }
    }

    /// The untagged candle.
    pub fn candle(&self) -> CandleRecord {
        CandleRecord {
            timestamp: self.timestamp,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}
