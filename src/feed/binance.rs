//! Binance REST kline candle source

use super::{Candle, CandleSource, FetchError};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

/// Binance REST base URL
pub const BINANCE_API_URL: &str = "https://api.binance.com";

/// Binance caps a single klines request at this many rows
const MAX_LIMIT: usize = 1000;

/// Configuration for the kline source
#[derive(Debug, Clone)]
pub struct KlineConfig {
    /// Base URL for the REST API
    pub base_url: String,
    /// Trading symbol (e.g., "BTCUSDT")
    pub symbol: String,
    /// Candle interval (e.g., "5m")
    pub interval: String,
    /// Number of candles per request
    pub limit: usize,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for KlineConfig {
    fn default() -> Self {
        Self {
            base_url: BINANCE_API_URL.to_string(),
            symbol: "BTCUSDT".to_string(),
            interval: "5m".to_string(),
            limit: 500,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Polls `/api/v3/klines` for the latest candles of one symbol
pub struct BinanceKlineSource {
    config: KlineConfig,
    client: Client,
}

impl BinanceKlineSource {
    /// Create a new kline source
    pub fn new(config: KlineConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            config: KlineConfig {
                symbol: config.symbol.to_uppercase(),
                ..config
            },
            client,
        })
    }

    /// Create a source with default configuration
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(KlineConfig::default())
    }

    /// Build the klines request URL
    fn build_url(&self) -> String {
        format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.symbol,
            self.config.interval,
            self.config.limit.min(MAX_LIMIT)
        )
    }

    /// Parse a raw kline response body into candles
    ///
    /// Any malformed row fails the whole batch so that downstream series
    /// never contain gaps.
    fn parse_rows(rows: &[Vec<Value>]) -> Result<Vec<Candle>, FetchError> {
        let mut candles: Vec<Candle> = Vec::with_capacity(rows.len());

        for (idx, row) in rows.iter().enumerate() {
            let candle = Self::parse_row(row)
                .ok_or_else(|| FetchError::Malformed(format!("invalid kline row at {}", idx)))?;

            if let Some(prev) = candles.last() {
                if candle.timestamp <= prev.timestamp {
                    return Err(FetchError::Malformed(format!(
                        "kline timestamps not increasing at {}",
                        idx
                    )));
                }
            }
            candles.push(candle);
        }

        Ok(candles)
    }

    /// Parse a single `[openTime, open, high, low, close, volume, ...]` row
    fn parse_row(row: &[Value]) -> Option<Candle> {
        if row.len() < 6 {
            return None;
        }

        let timestamp = DateTime::from_timestamp_millis(row[0].as_i64()?)?;
        let field = |i: usize| -> Option<Decimal> { Decimal::from_str(row[i].as_str()?).ok() };

        Some(Candle {
            timestamp,
            open: field(1)?,
            high: field(2)?,
            low: field(3)?,
            close: field(4)?,
            volume: field(5)?,
        })
    }
}

#[async_trait]
impl CandleSource for BinanceKlineSource {
    async fn fetch_candles(&self) -> Result<Vec<Candle>, FetchError> {
        let url = self.build_url();

        tracing::debug!(url = %url, "Fetching klines");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let rows: Vec<Vec<Value>> = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        let candles = Self::parse_rows(&rows)?;

        tracing::debug!(
            symbol = %self.config.symbol,
            count = candles.len(),
            "Fetched klines"
        );

        Ok(candles)
    }
}
