use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    config::ProviderConfig,
    models::{series_key::Symbol, timeframe::Timeframe},
    providers::{InternalSnafu, ProviderError},
};

/// Query of one klines page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KlinesQuery {
    pub symbol: String,
    pub interval: String,
    /// Inclusive lower bound on candle open time, epoch millis.
    pub start_time: i64,
    pub limit: u16,
}

impl KlinesQuery {
    pub fn new(symbol: &Symbol, timeframe: Timeframe, start_time: i64, limit: u16) -> Self {
        Self {
            symbol: symbol.to_string(),
            interval: timeframe.to_string(),
            start_time,
            limit,
        }
    }

    /// Same query, moved to the page after the candle opened at `last_open_time`.
    pub fn next_page(&self, last_open_time: i64) -> Self {
        Self {
            start_time: last_open_time + 1,
            ..self.clone()
        }
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("symbol", self.symbol.clone()),
            ("interval", self.interval.clone()),
            ("startTime", self.start_time.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

/// Open time of the first requested candle: the configured `start`, or
/// `history_days` before `now`.
///
/// A lookback reaching past the representable date range is an error.
pub fn window_start(
    config: &ProviderConfig,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ProviderError> {
    if let Some(start) = config.start {
        return Ok(start);
    }
    TimeDelta::try_days(i64::from(config.history_days))
        .and_then(|lookback| now.checked_sub_signed(lookback))
        .ok_or_else(|| {
            InternalSnafu {
                message: format!(
                    "history_days = {} reaches before the earliest representable date",
                    config.history_days
                ),
            }
            .build()
        })
}
