use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::models::candle::CandleRecord;

/// One kline as served by Binance: a positional array
/// `[open_time, open, high, low, close, volume, close_time, ...]`
/// with prices and volume encoded as strings.
pub type RawKline = Vec<Value>;

/// Error payload of a failed Binance request.
#[derive(Deserialize, Debug)]
pub struct BinanceErrorBody {
    pub code: i64,
    pub msg: String,
}

/// Best-effort readable message for an error response body.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<BinanceErrorBody>(body) {
        Ok(err) => format!("{} (code {})", err.msg, err.code),
        Err(_) if body.trim().is_empty() => "Unknown API error".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Open time of a kline in epoch millis.
pub fn open_time(kline: &[Value]) -> Result<i64, String> {
    kline
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| format!("kline has no integer open time: {kline:?}"))
}

pub fn to_candle(kline: &[Value]) -> Result<CandleRecord, String> {
    let open_ms = open_time(kline)?;
    let timestamp = DateTime::<Utc>::from_timestamp_millis(open_ms)
        .ok_or_else(|| format!("open time {open_ms} out of range"))?;

    Ok(CandleRecord {
        timestamp,
        open: decimal_at(kline, 1, "open")?,
        high: decimal_at(kline, 2, "high")?,
        low: decimal_at(kline, 3, "low")?,
        close: decimal_at(kline, 4, "close")?,
        volume: decimal_at(kline, 5, "volume")?,
    })
}

fn decimal_at(kline: &[Value], index: usize, field: &str) -> Result<Decimal, String> {
    let raw = kline
        .get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("kline field '{field}' missing or not a string"))?;
    Decimal::from_str(raw).map_err(|e| format!("kline field '{field}' = {raw:?}: {e}"))
}
