use snafu::{Backtrace, Snafu};

use crate::{io::StoreError, models::series_key::SeriesKey, providers::ProviderError};

/// Why a single `(symbol, timeframe)` download did not produce a file.
///
/// None of these leave anything behind in the store, so retrying the same
/// key is always safe.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DownloadError {
    /// The remote source failed (network, HTTP status, undecodable payload).
    #[snafu(display("Failed to fetch {key}: {source}"))]
    Fetch {
        key: SeriesKey,
        #[snafu(backtrace)]
        source: ProviderError,
    },

    /// The remote source answered with zero candles.
    #[snafu(display("Provider returned no candles for {key}"))]
    EmptyResult { key: SeriesKey, backtrace: Backtrace },

    /// The candles were fetched but could not be persisted.
    #[snafu(display("Failed to store {key}: {source}"))]
    Store {
        key: SeriesKey,
        #[snafu(backtrace)]
        source: StoreError,
    },
}

impl DownloadError {
    pub fn key(&self) -> &SeriesKey {
        match self {
            DownloadError::Fetch { key, .. }
            | DownloadError::EmptyResult { key, .. }
            | DownloadError::Store { key, .. } => key,
        }
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, DownloadError::Fetch { .. })
    }

    pub fn is_empty_result(&self) -> bool {
        matches!(self, DownloadError::EmptyResult { .. })
    }
}
