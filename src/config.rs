//! Configuration types for rsi-alert

use crate::alert::DebounceConfig;
use crate::crossover::ScanConfig;
use crate::feed::{KlineConfig, BINANCE_API_URL};
use crate::notify::{MessageFormat, TelegramConfig, TELEGRAM_API_URL};
use crate::oscillator::OscillatorConfig;
use crate::runner::LoopConfig;
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::time::Duration;

/// Environment variable overriding `notify.bot_token`
pub const BOT_TOKEN_ENV: &str = "BOT_TOKEN";
/// Environment variable overriding `notify.chat_id`
pub const CHAT_ID_ENV: &str = "CHAT_ID";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub oscillator: IndicatorConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Candle feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub base_url: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Candles per request
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_feed_url() -> String {
    BINANCE_API_URL.to_string()
}
fn default_symbol() -> String {
    "BTCUSDT".to_string()
}
fn default_interval() -> String {
    "5m".to_string()
}
fn default_limit() -> usize {
    500
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_url(),
            symbol: default_symbol(),
            interval: default_interval(),
            limit: default_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FeedConfig {
    pub fn kline_config(&self) -> KlineConfig {
        KlineConfig {
            base_url: self.base_url.clone(),
            symbol: self.symbol.clone(),
            interval: self.interval.clone(),
            limit: self.limit,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// RSI / EMA parameters
#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorConfig {
    /// RSI lookback, also the warm-up length
    #[serde(default = "default_period")]
    pub period: usize,
    /// EMA span over the RSI
    #[serde(default = "default_smoothing_span")]
    pub smoothing_span: usize,
}

fn default_period() -> usize {
    14
}
fn default_smoothing_span() -> usize {
    7
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            smoothing_span: default_smoothing_span(),
        }
    }
}

impl IndicatorConfig {
    pub fn oscillator_config(&self) -> OscillatorConfig {
        OscillatorConfig {
            period: self.period,
            smoothing_span: self.smoothing_span,
        }
    }
}

/// Crossover scan configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Trailing candles inspected per cycle
    #[serde(default = "default_window")]
    pub window: usize,
}

fn default_window() -> usize {
    50
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
        }
    }
}

/// Alert debounce configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    /// Minimum seconds between two alerts
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

fn default_cooldown_secs() -> u64 {
    300
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl AlertConfig {
    /// Cooldown as a duration, `None` when out of range
    pub fn cooldown(&self) -> Option<chrono::Duration> {
        i64::try_from(self.cooldown_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
    }

    pub fn debounce_config(&self) -> DebounceConfig {
        DebounceConfig {
            cooldown: self.cooldown().unwrap_or(chrono::Duration::MAX),
        }
    }
}

/// Loop cadence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Delay after a failed cycle
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    10
}
fn default_backoff_secs() -> u64 {
    5
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            backoff_secs: default_backoff_secs(),
        }
    }
}

impl ScheduleConfig {
    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            backoff: Duration::from_secs(self.backoff_secs),
        }
    }
}

/// Notification configuration
#[derive(Clone, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_telegram_url")]
    pub api_base: String,
    /// Telegram bot token; `BOT_TOKEN` overrides
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Telegram chat receiving alerts; `CHAT_ID` overrides
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default = "default_title")]
    pub title: String,
    /// Offset alert timestamps are shown in (default: IST)
    #[serde(default = "default_display_offset_minutes")]
    pub display_offset_minutes: i32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_telegram_url() -> String {
    TELEGRAM_API_URL.to_string()
}
fn default_title() -> String {
    "BTC TRADE Alert".to_string()
}
fn default_display_offset_minutes() -> i32 {
    330
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            api_base: default_telegram_url(),
            bot_token: None,
            chat_id: None,
            title: default_title(),
            display_offset_minutes: default_display_offset_minutes(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("api_base", &self.api_base)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("title", &self.title)
            .field("display_offset_minutes", &self.display_offset_minutes)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl NotifyConfig {
    pub fn message_format(&self) -> MessageFormat {
        MessageFormat {
            title: self.title.clone(),
            utc_offset_minutes: self.display_offset_minutes,
        }
    }

    /// Telegram sink settings; fails when the token or chat is missing
    pub fn telegram_config(&self) -> anyhow::Result<TelegramConfig> {
        let bot_token = self
            .bot_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow::anyhow!("notify.bot_token (or {}) is not set", BOT_TOKEN_ENV))?;
        let chat_id = self
            .chat_id
            .clone()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| anyhow::anyhow!("notify.chat_id (or {}) is not set", CHAT_ID_ENV))?;

        Ok(TelegramConfig {
            api_base: self.api_base.clone(),
            bot_token,
            chat_id,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply `BOT_TOKEN` / `CHAT_ID` from the environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(BOT_TOKEN_ENV).ok(),
            std::env::var(CHAT_ID_ENV).ok(),
        );
    }

    /// Replace notification credentials with any non-empty override
    pub fn apply_overrides(&mut self, bot_token: Option<String>, chat_id: Option<String>) {
        if let Some(token) = bot_token.filter(|t| !t.is_empty()) {
            self.notify.bot_token = Some(token);
        }
        if let Some(chat) = chat_id.filter(|c| !c.is_empty()) {
            self.notify.chat_id = Some(chat);
        }
    }

    /// Reject settings the loop cannot run with
    pub fn validate(&self, dry_run: bool) -> anyhow::Result<()> {
        if self.oscillator.period == 0 {
            anyhow::bail!("oscillator.period must be positive");
        }
        if self.oscillator.smoothing_span == 0 {
            anyhow::bail!("oscillator.smoothing_span must be positive");
        }
        if self.scanner.window == 0 {
            anyhow::bail!("scanner.window must be positive");
        }
        if self.alert.cooldown().is_none() {
            anyhow::bail!("alert.cooldown_secs ({}) is out of range", self.alert.cooldown_secs);
        }
        if self.feed.limit <= self.oscillator.period {
            anyhow::bail!(
                "feed.limit ({}) must exceed oscillator.period ({})",
                self.feed.limit,
                self.oscillator.period
            );
        }
        if !dry_run {
            self.notify.telegram_config()?;
        }
        Ok(())
    }

    /// Scanner settings, warm-up tied to the RSI period
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            warmup: self.oscillator.period,
            window: self.scanner.window,
        }
    }
}
