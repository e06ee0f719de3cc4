//! Candle feed module
//!
//! Fetches the most recent fixed-interval candles from Binance REST klines

mod binance;
mod types;

pub use binance::{BinanceKlineSource, KlineConfig, BINANCE_API_URL};
pub use types::{Candle, FetchError};

use async_trait::async_trait;

/// Trait for candle source implementations
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetch the most recent candles, oldest first
    async fn fetch_candles(&self) -> Result<Vec<Candle>, FetchError>;
}
