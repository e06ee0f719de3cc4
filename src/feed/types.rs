//! Candle feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single OHLCV candle for a fixed interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Candle open time
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Candle {
    /// Create a candle from its OHLCV fields
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Candle source errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(String),
    /// Request failed in transport (connect, timeout, body read)
    #[error("Candle request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Exchange answered with a non-success status
    #[error("Candle API error: {status} - {body}")]
    Status { status: u16, body: String },
    /// Response body did not match the expected kline layout
    #[error("Malformed candle response: {0}")]
    Malformed(String),
}
