//! The download-and-merge engine.
//!
//! [`CryptoDataDownloader`] ties a [`DataProvider`] to a [`LocalStore`] and
//! exposes the four caller-facing operations:
//!
//! - [`download_single`](CryptoDataDownloader::download_single)
//! - [`download_multiple`](CryptoDataDownloader::download_multiple)
//! - [`get_info`](CryptoDataDownloader::get_info)
//! - [`combine`](CryptoDataDownloader::combine)

mod batch;
mod combine;
mod errors;
mod single;

pub use batch::DownloadReport;
pub use combine::CombineError;
pub use errors::DownloadError;
pub use single::normalize_candles;

use crate::{
    config::DownloaderConfig,
    errors::Error,
    io::{LocalStore, StoreError},
    models::{dataset_info::DatasetInfo, series_key::SeriesKey},
    providers::{DataProvider, binance::BinanceProvider},
};

pub struct CryptoDataDownloader {
    store: LocalStore,
    provider: Box<dyn DataProvider + Send + Sync>,
    max_concurrency: usize,
}

impl CryptoDataDownloader {
    /// Builds a downloader around an explicit store and provider.
    ///
    /// Batch downloads run one key at a time until
    /// [`with_max_concurrency`](Self::with_max_concurrency) says otherwise.
    pub fn new(store: LocalStore, provider: impl DataProvider + Send + Sync + 'static) -> Self {
        Self {
            store,
            provider: Box::new(provider),
            max_concurrency: 1,
        }
    }

    /// Builds the Binance-backed downloader described by `config`.
    pub fn from_config(config: &DownloaderConfig) -> Result<Self, Error> {
        config.validate()?;
        let provider = BinanceProvider::new(config.provider.clone())?;
        Ok(Self::new(LocalStore::new(&config.data_dir), provider)
            .with_max_concurrency(config.max_concurrency))
    }

    /// Caps how many keys `download_multiple` has in flight; values below 1 mean 1.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Metadata of what is stored for `key`. Never triggers a download.
    pub fn get_info(&self, key: &SeriesKey) -> Result<DatasetInfo, StoreError> {
        self.store.stats(key)
    }
}
