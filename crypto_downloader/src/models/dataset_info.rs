//! Read-only metadata snapshot of one stored series.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{series_key::Symbol, timeframe::Timeframe};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// What is on disk for one `(symbol, timeframe)` pair, computed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInfo {
    pub symbol: Symbol,
    pub timeframe: Timeframe,
    pub path: PathBuf,
    /// Number of data rows, header excluded.
    pub rows: usize,
    /// Earliest candle open time; `None` for a header-only file.
    pub start: Option<DateTime<Utc>>,
    /// Latest candle open time; `None` for a header-only file.
    pub end: Option<DateTime<Utc>>,
    pub file_size_bytes: u64,
    pub modified: DateTime<Utc>,
}

impl DatasetInfo {
    pub fn file_size_mb(&self) -> f64 {
        self.file_size_bytes as f64 / BYTES_PER_MB
    }
}
