//! Oscillator engine
//!
//! Computes RSI over candle closes and its EMA trigger line. Each call
//! recomputes from scratch over the supplied window; nothing is cached.

mod engine;
mod types;

pub use engine::{rsi, smooth, OscillatorConfig, OscillatorEngine};
pub use types::{InsufficientData, OscillatorSeries, SeriesPoint};
