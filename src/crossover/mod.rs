//! Crossover scanner
//!
//! Scans the trailing window of an RSI / RSI-EMA series for sign changes
//! of `rsi - ema` and values each crossing against the following candle.

mod scanner;
mod types;

pub use scanner::{CrossoverScanner, ScanConfig};
pub use types::{CrossoverEvent, Direction};
