//! Oscillator series types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One point of the oscillator series, index-aligned with its candle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Timestamp of the candle this point belongs to
    pub timestamp: DateTime<Utc>,
    /// RSI value in [0, 100]; `None` during warm-up
    pub oscillator: Option<f64>,
    /// EMA of the RSI; `None` during warm-up
    pub smoothed: Option<f64>,
}

/// Raw parallel output of the engine
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorSeries {
    pub oscillator: Vec<Option<f64>>,
    pub smoothed: Vec<Option<f64>>,
}

/// Too few closes to produce a single defined oscillator value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Insufficient data: need at least {required} candles, got {available}")]
pub struct InsufficientData {
    pub required: usize,
    pub available: usize,
}
