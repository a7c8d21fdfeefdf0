use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use snafu::ResultExt;
use tracing::{debug, warn};

use crate::{
    config::ProviderConfig,
    models::{candle::CandleRecord, series_key::Symbol, timeframe::Timeframe},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InternalSnafu, InvalidBaseUrlSnafu,
        ProviderError, ProviderInitError, ReqwestSnafu,
        binance::{
            params::{KlinesQuery, window_start},
            response::{RawKline, error_message, open_time, to_candle},
        },
    },
};

const KLINES_PATH: &str = "api/v3/klines";

pub struct BinanceProvider {
    client: Client,
    klines_url: Url,
    config: ProviderConfig,
}

impl BinanceProvider {
    /// Creates a provider for the configured Binance-compatible base URL.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderInitError> {
        let base = config.base_url.trim();
        // A trailing slash makes `join` append instead of replacing the last segment.
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        let klines_url = Url::parse(&base)
            .and_then(|url| url.join(KLINES_PATH))
            .map_err(|e| {
                InvalidBaseUrlSnafu {
                    url: config.base_url.clone(),
                    message: e.to_string(),
                }
                .build()
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("crypto_downloader/", env!("CARGO_PKG_VERSION")))
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            klines_url,
            config,
        })
    }

    async fn fetch_page(&self, query: &KlinesQuery) -> Result<Vec<RawKline>, ProviderError> {
        let response = self
            .client
            .get(self.klines_url.clone())
            .query(&query.to_pairs())
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return ApiSnafu {
                status: status.as_u16(),
                message: error_message(&body),
            }
            .fail();
        }

        response.json::<Vec<RawKline>>().await.context(ReqwestSnafu)
    }
}

#[async_trait]
impl DataProvider for BinanceProvider {
    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> Result<Vec<CandleRecord>, ProviderError> {
        let start = window_start(&self.config, Utc::now())?;
        let limit = self.config.page_limit;
        let mut query = KlinesQuery::new(symbol, timeframe, start.timestamp_millis(), limit);
        let mut candles = Vec::new();

        for page in 1..=self.config.max_pages {
            let klines = self.fetch_page(&query).await?;
            let fetched = klines.len();
            debug!(%symbol, %timeframe, page, fetched, start_time = query.start_time, "fetched klines page");

            let Some(last) = klines.last() else {
                break;
            };
            let last_open = open_time(last).map_err(|message| InternalSnafu { message }.build())?;

            for kline in &klines {
                candles.push(to_candle(kline).map_err(|message| InternalSnafu { message }.build())?);
            }

            if fetched < usize::from(limit) {
                break;
            }
            if last_open < query.start_time {
                // Source ignored startTime; paging further would loop.
                break;
            }
            if page == self.config.max_pages {
                warn!(%symbol, %timeframe, max_pages = page, "page limit reached, history truncated");
            }
            query = query.next_page(last_open);
        }

        Ok(candles)
    }
}
