//! Notification delivery
//!
//! Formats an accepted crossover as text and hands it to a sink

mod message;
mod telegram;

pub use message::{format_alert, MessageFormat};
pub use telegram::{TelegramConfig, TelegramNotifier, TELEGRAM_API_URL};

use async_trait::async_trait;
use thiserror::Error;

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(String),
    /// Request failed in transport. The error carries no URL, since
    /// the Telegram URL embeds the bot token.
    #[error("Notification request failed: {0}")]
    Transport(reqwest::Error),
    /// Sink rejected the message
    #[error("Notification rejected: {status} - {description}")]
    Rejected { status: u16, description: String },
}

/// Trait for notification sinks
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one message to the configured recipient
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: NotificationSink + ?Sized> NotificationSink for Box<T> {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        (**self).send(message).await
    }
}

/// Sink that only logs messages (dry run)
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        tracing::info!(message = %message, "Dry run, alert not delivered");
        Ok(())
    }
}
