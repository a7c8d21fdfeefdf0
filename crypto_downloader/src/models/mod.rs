pub mod candle;
pub mod dataset_info;
pub mod series_key;
pub mod timeframe;
