//! Telegram Bot API sink

use super::{NotificationSink, NotifyError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Telegram Bot API base URL
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Configuration for the Telegram sink
#[derive(Clone)]
pub struct TelegramConfig {
    /// Base URL for the Bot API
    pub api_base: String,
    /// Bot token
    pub bot_token: String,
    /// Recipient chat
    pub chat_id: String,
    /// Request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_base", &self.api_base)
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Bot API response envelope
#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends alerts with `sendMessage`
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: Client,
}

impl TelegramNotifier {
    /// Create a new Telegram sink
    pub fn new(config: TelegramConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        )
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .get(self.send_message_url())
            .query(&[("chat_id", self.config.chat_id.as_str()), ("text", message)])
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        let status = response.status();
        let body: Option<TelegramResponse> = response.json().await.ok();

        match body {
            Some(body) if status.is_success() && body.ok => {
                tracing::debug!(chat_id = %self.config.chat_id, "Alert delivered");
                Ok(())
            }
            Some(body) => Err(NotifyError::Rejected {
                status: status.as_u16(),
                description: body.description.unwrap_or_default(),
            }),
            None => Err(NotifyError::Rejected {
                status: status.as_u16(),
                description: "unreadable response".to_string(),
            }),
        }
    }
}
