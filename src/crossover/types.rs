//! Crossover event types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an RSI / RSI-EMA crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// RSI crossed above its EMA
    Bullish,
    /// RSI crossed below its EMA
    Bearish,
}

impl Direction {
    /// Human-readable action label used in alerts
    pub fn action(&self) -> &'static str {
        match self {
            Direction::Bullish => "Bullish Crossover (Buy)",
            Direction::Bearish => "Bearish Crossover (Sell)",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Bullish => write!(f, "bullish"),
            Direction::Bearish => write!(f, "bearish"),
        }
    }
}

/// A detected crossover, valued against the next candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossoverEvent {
    /// Timestamp of the crossover candle
    pub timestamp: DateTime<Utc>,
    /// Close of the crossover candle
    pub signal_price: Decimal,
    /// Favourable excursion on the next candle; zero if there is none
    pub price_difference: Decimal,
    pub direction: Direction,
}

impl CrossoverEvent {
    pub fn is_bullish(&self) -> bool {
        self.direction == Direction::Bullish
    }

    pub fn is_bearish(&self) -> bool {
        self.direction == Direction::Bearish
    }
}
