//! CLI interface for rsi-alert
//!
//! A single long-running command; there are no subcommands.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "rsi-alert")]
#[command(about = "RSI / RSI-EMA crossover alerts for Binance candles")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Log alerts instead of delivering them
    #[arg(long)]
    pub dry_run: bool,

    /// Stop after this many cycles (runs forever when omitted)
    #[arg(long)]
    pub max_cycles: Option<u64>,
}
