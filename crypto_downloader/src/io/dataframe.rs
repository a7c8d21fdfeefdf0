//! Polars views of stored candles, for analysis outside the engine.
//!
//! Timestamps become epoch milliseconds (`i64`) and decimals become `f64`;
//! the CSV files stay the lossless source of truth.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use polars_io::SerWriter;
use polars_io::ipc::IpcWriter;
use rust_decimal::prelude::ToPrimitive;

use crate::models::candle::{CandleRecord, CombinedRecord};

fn to_f64(values: impl Iterator<Item = rust_decimal::Decimal>) -> Vec<f64> {
    values.map(|d| d.to_f64().unwrap_or(f64::NAN)).collect()
}

pub fn candles_to_dataframe(candles: &[CandleRecord]) -> PolarsResult<DataFrame> {
    df!(
        "timestamp" => candles.iter().map(|c| c.timestamp.timestamp_millis()).collect::<Vec<i64>>(),
        "open" => to_f64(candles.iter().map(|c| c.open)),
        "high" => to_f64(candles.iter().map(|c| c.high)),
        "low" => to_f64(candles.iter().map(|c| c.low)),
        "close" => to_f64(candles.iter().map(|c| c.close)),
        "volume" => to_f64(candles.iter().map(|c| c.volume))
    )
}

pub fn combined_to_dataframe(rows: &[CombinedRecord]) -> PolarsResult<DataFrame> {
    df!(
        "timestamp" => rows.iter().map(|r| r.timestamp.timestamp_millis()).collect::<Vec<i64>>(),
        "open" => to_f64(rows.iter().map(|r| r.open)),
        "high" => to_f64(rows.iter().map(|r| r.high)),
        "low" => to_f64(rows.iter().map(|r| r.low)),
        "close" => to_f64(rows.iter().map(|r| r.close)),
        "volume" => to_f64(rows.iter().map(|r| r.volume)),
        "timeframe" => rows.iter().map(|r| r.timeframe.to_string()).collect::<Vec<String>>()
    )
}

/// Writes `df` as an Arrow IPC (Feather) file.
pub fn write_dataframe_ipc(df: &mut DataFrame, path: &Path) -> PolarsResult<()> {
    let mut file = File::create(path)?;
    IpcWriter::new(&mut file).finish(df)?;
    Ok(())
}
