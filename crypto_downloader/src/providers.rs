//! Provider abstraction for remote candle sources.
//!
//! This module defines the [`DataProvider`] trait, the single seam between the
//! downloader and whatever exchange API serves historical klines. Each concrete
//! source (currently [`binance::BinanceProvider`]) implements it and maps its
//! vendor-specific failures onto [`ProviderError`].
//!
//! The trait is async and object-safe, so the downloader can hold a
//! `Box<dyn DataProvider + Send + Sync>` and tests can swap in a scripted fake.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use crypto_downloader::models::{
//!     candle::CandleRecord, series_key::Symbol, timeframe::Timeframe,
//! };
//! use crypto_downloader::providers::{DataProvider, ProviderError};
//!
//! struct EmptyProvider;
//!
//! #[async_trait]
//! impl DataProvider for EmptyProvider {
//!     async fn fetch_candles(
//!         &self,
//!         _symbol: &Symbol,
//!         _timeframe: Timeframe,
//!     ) -> Result<Vec<CandleRecord>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod binance;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::{candle::CandleRecord, series_key::Symbol, timeframe::Timeframe};

/// Trait for fetching the candle history of one symbol at one timeframe.
#[async_trait]
pub trait DataProvider {
    /// Fetches all candles the source serves for `symbol` at `timeframe`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<CandleRecord>)` - candles in the order the source delivered them;
    ///   may be empty, unsorted or contain duplicates.
    /// * `Err(ProviderError)` - network, API or decoding failure.
    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> Result<Vec<CandleRecord>, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The configured base URL cannot be parsed.
    #[snafu(display("Invalid base URL '{url}': {message}"))]
    InvalidBaseUrl {
        url: String,
        message: String,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout, undecodable body).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API answered with an error status.
    #[snafu(display("API error (HTTP {status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// An internal error occurred while processing data within the provider.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },
}
