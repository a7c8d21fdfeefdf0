use thiserror::Error;

use crate::{
    config::ConfigError,
    downloader::{CombineError, DownloadError},
    io::StoreError,
    models::series_key::SeriesKeyError,
    providers::ProviderInitError,
};

/// The unified error type for the `crypto_downloader` crate.
///
/// Each operation returns its own error; this type lets callers mixing
/// several operations propagate all of them with `?`.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The remote source client could not be built.
    #[error(transparent)]
    ProviderInit(#[from] ProviderInitError),

    /// A symbol or timeframe given as text did not validate.
    #[error(transparent)]
    Key(#[from] SeriesKeyError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Combine(#[from] CombineError),

    /// A store lookup such as `get_info` failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
