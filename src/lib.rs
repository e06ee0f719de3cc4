//! rsi-alert: RSI / RSI-EMA crossover alerts
//!
//! This library provides the components for:
//! - Fetching recent 5-minute candles from Binance
//! - Computing RSI and its EMA trigger line
//! - Scanning the trailing window for crossovers
//! - Debouncing alerts by cooldown and direction
//! - Delivering alerts to Telegram
//! - The polling loop tying them together

pub mod alert;
pub mod cli;
pub mod config;
pub mod crossover;
pub mod feed;
pub mod notify;
pub mod oscillator;
pub mod runner;
pub mod telemetry;
