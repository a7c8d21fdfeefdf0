use std::path::PathBuf;

use futures::{StreamExt, stream};
use indexmap::{IndexMap, IndexSet};
use tracing::{info, warn};

use crate::{
    downloader::{CryptoDataDownloader, errors::DownloadError},
    models::{
        series_key::{SeriesKey, Symbol},
        timeframe::Timeframe,
    },
};

/// Outcome of a batch download, in attempt order.
#[derive(Debug, Default)]
pub struct DownloadReport {
    pub succeeded: IndexMap<SeriesKey, PathBuf>,
    pub failed: Vec<(SeriesKey, DownloadError)>,
}

impl DownloadReport {
    /// True when every attempted key produced a file.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Looks a path up by its `{symbol}_{timeframe}` label, e.g. `BTCUSDT_15m`.
    pub fn path_for_label(&self, label: &str) -> Option<&PathBuf> {
        self.succeeded
            .iter()
            .find(|(key, _)| key.to_string() == label)
            .map(|(_, path)| path)
    }

    pub fn failed_keys(&self) -> impl Iterator<Item = &SeriesKey> {
        self.failed.iter().map(|(key, _)| key)
    }
}

impl CryptoDataDownloader {
    /// Downloads every `symbols × timeframes` pair.
    ///
    /// Pairs are attempted symbol-major in the order given, repeated pairs
    /// once. A failing pair is recorded in the report and does not stop the
    /// others.
    pub async fn download_multiple(
        &self,
        symbols: &[Symbol],
        timeframes: &[Timeframe],
        overwrite: bool,
    ) -> DownloadReport {
        let keys: IndexSet<SeriesKey> = symbols
            .iter()
            .flat_map(|symbol| {
                timeframes
                    .iter()
                    .map(move |tf| SeriesKey::new(symbol.clone(), *tf))
            })
            .collect();

        // `buffered` yields in input order even when fetches overlap.
        let outcomes: Vec<_> = stream::iter(keys)
            .map(|key| async move {
                let result = self.download_single(&key, overwrite).await;
                (key, result)
            })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut report = DownloadReport::default();
        for (key, result) in outcomes {
            match result {
                Ok(path) => {
                    report.succeeded.insert(key, path);
                }
                Err(err) => {
                    warn!(%key, error = %err, "download failed");
                    report.failed.push((key, err));
                }
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "batch download finished"
        );
        report
    }
}
