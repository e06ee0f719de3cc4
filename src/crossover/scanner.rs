//! Trailing-window crossover scan

use super::types::{CrossoverEvent, Direction};
use crate::feed::Candle;
use crate::oscillator::SeriesPoint;
use rust_decimal::Decimal;
use std::ops::Range;

/// Configuration for the crossover scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// First index that may be reported (the oscillator warm-up, default: 14)
    pub warmup: usize,
    /// Number of trailing candles inspected (default: 50)
    pub window: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            warmup: 14,
            window: 50,
        }
    }
}

/// Finds RSI / RSI-EMA crossings in the most recent candles
#[derive(Debug, Clone, Default)]
pub struct CrossoverScanner {
    config: ScanConfig,
}

impl CrossoverScanner {
    /// Create a scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Create a scanner with warm-up 14 and a 50-candle window
    pub fn with_defaults() -> Self {
        Self::new(ScanConfig::default())
    }

    /// Indices inspected for a series of length `n`.
    ///
    /// The last candle is never inspected: it is still forming and has no
    /// successor to value the signal against.
    fn bounds(&self, n: usize) -> Range<usize> {
        let start = self
            .config
            .warmup
            .max(n.saturating_sub(self.config.window))
            .max(1);
        start..n.saturating_sub(1)
    }

    /// Lazily yield crossovers in the trailing window, oldest first.
    ///
    /// `candles` and `series` are index-aligned; any excess on the longer
    /// side is ignored. Points with an undefined value are skipped.
    pub fn scan<'a>(
        &self,
        candles: &'a [Candle],
        series: &'a [SeriesPoint],
    ) -> impl Iterator<Item = CrossoverEvent> + 'a {
        let n = candles.len().min(series.len());

        self.bounds(n).filter_map(move |i| {
            let prev = &series[i - 1];
            let curr = &series[i];
            let direction = Self::classify(
                (prev.oscillator?, prev.smoothed?),
                (curr.oscillator?, curr.smoothed?),
            )?;

            let signal_price = candles[i].close;
            let price_difference = match (direction, candles.get(i + 1)) {
                (Direction::Bullish, Some(next)) => next.high - signal_price,
                (Direction::Bearish, Some(next)) => signal_price - next.low,
                (_, None) => Decimal::ZERO,
            };

            Some(CrossoverEvent {
                timestamp: candles[i].timestamp,
                signal_price,
                price_difference,
                direction,
            })
        })
    }

    /// The most recent crossover in the window, if any
    pub fn latest(&self, candles: &[Candle], series: &[SeriesPoint]) -> Option<CrossoverEvent> {
        self.scan(candles, series).last()
    }

    /// Classify a transition between two `(rsi, ema)` pairs.
    ///
    /// The current point must be strictly on the new side; touching does not count.
    fn classify(prev: (f64, f64), curr: (f64, f64)) -> Option<Direction> {
        let (prev_osc, prev_smoothed) = prev;
        let (curr_osc, curr_smoothed) = curr;

        if prev_osc <= prev_smoothed && curr_osc > curr_smoothed {
            Some(Direction::Bullish)
        } else if prev_osc >= prev_smoothed && curr_osc < curr_smoothed {
            Some(Direction::Bearish)
        } else {
            None
        }
    }
}
