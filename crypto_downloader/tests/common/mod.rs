#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use crypto_downloader::{
    CandleRecord, CryptoDataDownloader, LocalStore, SeriesKey, Symbol, Timeframe,
    providers::{DataProvider, InternalSnafu, ProviderError},
};
use rust_decimal::Decimal;
use tempfile::TempDir;

/// One scripted answer of the fake provider.
pub enum Reply {
    Candles(Vec<CandleRecord>),
    Fail(String),
}

#[derive(Default)]
struct State {
    replies: HashMap<String, VecDeque<Reply>>,
    calls: Vec<String>,
}

/// Provider fake answering from per-key queues and recording every call.
///
/// Once a key's queue is drained it answers with zero candles.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    state: Arc<Mutex<State>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, key: &str, reply: Reply) -> &Self {
        self.state
            .lock()
            .unwrap()
            .replies
            .entry(key.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn candles(&self, key: &str, candles: Vec<CandleRecord>) -> &Self {
        self.reply(key, Reply::Candles(candles))
    }

    pub fn fail(&self, key: &str, message: &str) -> &Self {
        self.reply(key, Reply::Fail(message.to_string()))
    }

    /// Keys fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }
}

#[async_trait]
impl DataProvider for ScriptedProvider {
    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> Result<Vec<CandleRecord>, ProviderError> {
        let key = format!("{symbol}_{timeframe}");
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(key.clone());
            state.replies.get_mut(&key).and_then(VecDeque::pop_front)
        };
        tokio::task::yield_now().await;

        match reply {
            Some(Reply::Candles(candles)) => Ok(candles),
            Some(Reply::Fail(message)) => InternalSnafu { message }.fail(),
            None => Ok(Vec::new()),
        }
    }
}

/// A downloader over a fresh temp directory. Keep the `TempDir` alive for the test.
pub fn setup() -> (TempDir, ScriptedProvider, CryptoDataDownloader) {
    let dir = TempDir::new().expect("tempdir");
    let provider = ScriptedProvider::new();
    let downloader = CryptoDataDownloader::new(LocalStore::new(dir.path()), provider.clone());
    (dir, provider, downloader)
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn candle_at(timestamp: DateTime<Utc>, close: i64) -> CandleRecord {
    let close = Decimal::from(close);
    CandleRecord {
        timestamp,
        open: close,
        high: close + Decimal::ONE,
        low: close - Decimal::ONE,
        close,
        volume: Decimal::new(15, 1),
    }
}

/// `n` consecutive candles `step` apart, closes 100, 101, ...
pub fn series(start: DateTime<Utc>, step: Duration, n: i64) -> Vec<CandleRecord> {
    (0..n)
        .map(|i| candle_at(start + step * i as i32, 100 + i))
        .collect()
}

pub fn key(symbol: &str, timeframe: Timeframe) -> SeriesKey {
    SeriesKey::new(Symbol::new(symbol).unwrap(), timeframe)
}

pub fn symbol(raw: &str) -> Symbol {
    Symbol::new(raw).unwrap()
}
