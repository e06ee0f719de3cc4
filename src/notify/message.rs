//! Alert message text

use crate::crossover::CrossoverEvent;
use chrono::{FixedOffset, Offset, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Presentation settings for alert messages
#[derive(Debug, Clone)]
pub struct MessageFormat {
    /// First line of every alert
    pub title: String,
    /// UTC offset timestamps are rendered in, in minutes (default: IST, +330)
    pub utc_offset_minutes: i32,
}

impl Default for MessageFormat {
    fn default() -> Self {
        Self {
            title: "BTC TRADE Alert".to_string(),
            utc_offset_minutes: 330,
        }
    }
}

impl MessageFormat {
    /// Display offset; out-of-range values fall back to UTC
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

/// Render a crossover as the alert text
pub fn format_alert(event: &CrossoverEvent, format: &MessageFormat) -> String {
    format!(
        "**{}**\n{}\nPrice: {:.2}\nAction: {}\nPrice Diff: {:.2}",
        format.title,
        event
            .timestamp
            .with_timezone(&format.offset())
            .format("%Y-%m-%d %H:%M:%S"),
        cents(event.signal_price),
        event.direction.action(),
        cents(event.price_difference),
    )
}

/// Round half away from zero to 2 dp
fn cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
