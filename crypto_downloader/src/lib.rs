//! Historical crypto candle downloader.
//!
//! Fetches OHLCV candles per `(symbol, timeframe)` from an exchange, keeps
//! one CSV file per pair under a configured directory, reports metadata of
//! stored files, and merges several timeframes of a symbol into one table.
//!
//! ```no_run
//! use crypto_downloader::{CryptoDataDownloader, DownloaderConfig, SeriesKey};
//!
//! # async fn run() -> Result<(), crypto_downloader::Error> {
//! let config = DownloaderConfig::default().apply_env_overrides();
//! let downloader = CryptoDataDownloader::from_config(&config)?;
//!
//! let key = SeriesKey::parse("BTCUSDT", "15m")?;
//! let path = downloader.download_single(&key, false).await?;
//! let info = downloader.get_info(&key)?;
//! println!("{} rows in {}", info.rows, path.display());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod downloader;
pub mod errors;
pub mod io;
pub mod models;
pub mod providers;

pub use config::DownloaderConfig;
pub use downloader::{CombineError, CryptoDataDownloader, DownloadError, DownloadReport};
pub use errors::Error;
pub use io::{LocalStore, StoreError};
pub use models::{
    candle::{CandleRecord, CombinedRecord},
    dataset_info::DatasetInfo,
    series_key::{SeriesKey, Symbol},
    timeframe::Timeframe,
};
