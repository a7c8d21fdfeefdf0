use std::collections::BTreeMap;
use std::path::PathBuf;

use snafu::{ResultExt, ensure};
use tracing::{debug, info};

use crate::{
    downloader::{
        CryptoDataDownloader,
        errors::{DownloadError, EmptyResultSnafu, FetchSnafu, StoreSnafu},
    },
    models::{candle::CandleRecord, series_key::SeriesKey},
};

impl CryptoDataDownloader {
    /// Downloads one series and stores it, returning the file path.
    ///
    /// Without `overwrite`, an existing file short-circuits the call and the
    /// provider is not contacted. A failed call never touches the store.
    pub async fn download_single(
        &self,
        key: &SeriesKey,
        overwrite: bool,
    ) -> Result<PathBuf, DownloadError> {
        if !overwrite && self.store.exists(key) {
            let path = self.store.path_for(key);
            debug!(%key, path = %path.display(), "already stored, skipping fetch");
            return Ok(path);
        }

        let fetched = self
            .provider
            .fetch_candles(&key.symbol, key.timeframe)
            .await
            .context(FetchSnafu { key: key.clone() })?;
        ensure!(!fetched.is_empty(), EmptyResultSnafu { key: key.clone() });

        let fetched_rows = fetched.len();
        let candles = normalize_candles(fetched);
        let path = self
            .store
            .write(key, &candles)
            .context(StoreSnafu { key: key.clone() })?;

        info!(
            %key,
            rows = candles.len(),
            duplicates = fetched_rows - candles.len(),
            path = %path.display(),
            "downloaded series"
        );
        Ok(path)
    }
}

/// Sorts candles by timestamp and keeps one per timestamp; of several
/// candles sharing a timestamp, the one supplied last wins.
pub fn normalize_candles(candles: Vec<CandleRecord>) -> Vec<CandleRecord> {
    let mut by_time = BTreeMap::new();
    for candle in candles {
        by_time.insert(candle.timestamp, candle);
    }
    by_time.into_values().collect()
}
