use std::collections::HashSet;
use std::path::PathBuf;

use snafu::{Backtrace, ResultExt, Snafu, ensure};
use tracing::info;

use crate::{
    downloader::CryptoDataDownloader,
    io::StoreError,
    models::{
        candle::CombinedRecord,
        series_key::{SeriesKey, Symbol},
        timeframe::Timeframe,
    },
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CombineError {
    /// The timeframe list is empty or repeats an entry.
    #[snafu(display("Invalid combine request: {message}"))]
    InvalidRequest { message: String, backtrace: Backtrace },

    /// One of the requested timeframes has not been downloaded.
    #[snafu(display("No {timeframe} data stored for {symbol}"))]
    MissingSource {
        symbol: Symbol,
        timeframe: Timeframe,
        backtrace: Backtrace,
    },

    /// Reading a source or writing the combined file failed.
    #[snafu(display("Combine failed: {source}"))]
    Store {
        #[snafu(backtrace)]
        source: StoreError,
    },
}

impl CryptoDataDownloader {
    /// Merges the stored `timeframes` of `symbol` into one table and writes it
    /// to the symbol's combined file.
    ///
    /// Rows are grouped in blocks, one per timeframe, in the order given;
    /// each block keeps its file order. Nothing is written unless every
    /// source is present.
    pub fn combine(
        &self,
        symbol: &Symbol,
        timeframes: &[Timeframe],
    ) -> Result<PathBuf, CombineError> {
        ensure!(
            !timeframes.is_empty(),
            InvalidRequestSnafu {
                message: "at least one timeframe is required"
            }
        );
        let mut seen = HashSet::new();
        if let Some(dup) = timeframes.iter().find(|tf| !seen.insert(**tf)) {
            return InvalidRequestSnafu {
                message: format!("timeframe {dup} listed more than once"),
            }
            .fail();
        }

        let keys: Vec<SeriesKey> = timeframes
            .iter()
            .map(|tf| SeriesKey::new(symbol.clone(), *tf))
            .collect();
        if let Some(missing) = keys.iter().find(|key| !self.store.exists(key)) {
            return MissingSourceSnafu {
                symbol: symbol.clone(),
                timeframe: missing.timeframe,
            }
            .fail();
        }

        let mut rows = Vec::new();
        for key in &keys {
            let candles = match self.store.read(key) {
                Ok(candles) => candles,
                // Removed between the existence check and the read.
                Err(e) if e.is_not_found() => {
                    return MissingSourceSnafu {
                        symbol: symbol.clone(),
                        timeframe: key.timeframe,
                    }
                    .fail();
                }
                Err(e) => return Err(e).context(StoreSnafu),
            };
            rows.extend(
                candles
                    .into_iter()
                    .map(|candle| CombinedRecord::new(candle, key.timeframe)),
            );
        }

        let path = self
            .store
            .write_combined(symbol, &rows)
            .context(StoreSnafu)?;
        info!(
            %symbol,
            timeframes = ?timeframes.iter().map(ToString::to_string).collect::<Vec<_>>(),
            rows = rows.len(),
            path = %path.display(),
            "combined series"
        );
        Ok(path)
    }
}
