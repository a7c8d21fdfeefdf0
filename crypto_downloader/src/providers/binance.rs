//! Binance spot klines (`GET /api/v3/klines`), public endpoint, no API key.

pub mod params;
pub mod provider;
pub mod response;

pub use provider::BinanceProvider;
