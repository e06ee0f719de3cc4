//! RSI and EMA computation

use super::types::{InsufficientData, OscillatorSeries, SeriesPoint};
use crate::feed::Candle;
use rust_decimal::prelude::ToPrimitive;

/// Configuration for the oscillator engine
#[derive(Debug, Clone)]
pub struct OscillatorConfig {
    /// RSI lookback period (default: 14)
    pub period: usize,
    /// EMA span applied to the RSI (default: 7)
    pub smoothing_span: usize,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            period: 14,
            smoothing_span: 7,
        }
    }
}

/// Wilder RSI over `closes`.
///
/// Index `i` is `None` for `i < period`. The first value is seeded with the
/// simple mean of the first `period` gains and losses, later values use
/// Wilder smoothing. When both averages are zero the value is 0.
pub fn rsi(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>, InsufficientData> {
    let period = period.max(1);
    let required = period + 1;
    if closes.len() < required {
        return Err(InsufficientData {
            required,
            available: closes.len(),
        });
    }

    let n = closes.len();
    let mut out = vec![None; n];

    let (mut avg_gain, mut avg_loss) = (0.0, 0.0);
    for i in 1..=period {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    let p = period as f64;
    for i in (period + 1)..n {
        let change = closes[i] - closes[i - 1];
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    Ok(out)
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    let total = avg_gain + avg_loss;
    if total == 0.0 {
        0.0
    } else {
        100.0 * avg_gain / total
    }
}

/// Exponential moving average with `alpha = 2 / (span + 1)`.
///
/// Seeded by the first defined input; undefined inputs before the seed stay
/// undefined, undefined inputs after it carry the previous average forward.
pub fn smooth(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    let mut prev: Option<f64> = None;

    values
        .iter()
        .map(|value| {
            prev = match (prev, *value) {
                (None, v) => v,
                (Some(p), Some(v)) => Some(alpha * v + (1.0 - alpha) * p),
                (Some(p), None) => Some(p),
            };
            prev
        })
        .collect()
}

/// Stateless RSI + RSI-EMA engine
#[derive(Debug, Clone, Default)]
pub struct OscillatorEngine {
    config: OscillatorConfig,
}

impl OscillatorEngine {
    /// Create an engine with the given configuration
    pub fn new(config: OscillatorConfig) -> Self {
        Self { config }
    }

    /// Create an engine with period 14 and span 7
    pub fn with_defaults() -> Self {
        Self::new(OscillatorConfig::default())
    }

    /// Compute both series from raw closes
    pub fn compute(&self, closes: &[f64]) -> Result<OscillatorSeries, InsufficientData> {
        let oscillator = rsi(closes, self.config.period)?;
        let smoothed = smooth(&oscillator, self.config.smoothing_span);
        Ok(OscillatorSeries {
            oscillator,
            smoothed,
        })
    }

    /// Compute the series for a candle window, one point per candle
    pub fn series(&self, candles: &[Candle]) -> Result<Vec<SeriesPoint>, InsufficientData> {
        let closes: Vec<f64> = candles
            .iter()
            .map(|c| c.close.to_f64().unwrap_or(f64::NAN))
            .collect();

        let computed = self.compute(&closes)?;

        Ok(candles
            .iter()
            .zip(computed.oscillator)
            .zip(computed.smoothed)
            .map(|((candle, oscillator), smoothed)| SeriesPoint {
                timestamp: candle.timestamp,
                oscillator,
                smoothed,
            })
            .collect())
    }
}
