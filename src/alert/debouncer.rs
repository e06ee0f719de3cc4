//! Cooldown and direction-change filter

use super::types::{AlertDecision, DebounceState, SuppressReason};
use crate::crossover::CrossoverEvent;
use chrono::{DateTime, Duration, Utc};

/// Configuration for the alert debouncer
#[derive(Debug, Clone)]
pub struct DebounceConfig {
    /// Minimum spacing between two alerts (default: 5 minutes)
    pub cooldown: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::minutes(5),
        }
    }
}

/// Filters crossovers down to materially new alerts
#[derive(Debug, Clone, Default)]
pub struct AlertDebouncer {
    config: DebounceConfig,
}

impl AlertDebouncer {
    /// Create a debouncer with the given configuration
    pub fn new(config: DebounceConfig) -> Self {
        Self { config }
    }

    /// Create a debouncer with a 5 minute cooldown
    pub fn with_defaults() -> Self {
        Self::new(DebounceConfig::default())
    }

    pub fn cooldown(&self) -> Duration {
        self.config.cooldown
    }

    /// Decide without touching the state.
    ///
    /// Rules, in order: no event suppresses; an alert less than `cooldown`
    /// ago suppresses whatever the direction; a repeat of the last alerted
    /// direction suppresses. The cooldown boundary instant itself is allowed.
    pub fn evaluate(
        &self,
        latest: Option<&CrossoverEvent>,
        now: DateTime<Utc>,
        state: &DebounceState,
    ) -> AlertDecision {
        let Some(event) = latest else {
            return AlertDecision::Suppress(SuppressReason::NoEvents);
        };

        if let Some(last_at) = state.last_alert_at {
            let until = last_at
                .checked_add_signed(self.config.cooldown)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            if now < until {
                return AlertDecision::Suppress(SuppressReason::Cooldown { until });
            }
        }

        if state.last_direction == Some(event.direction) {
            return AlertDecision::Suppress(SuppressReason::SameDirection(event.direction));
        }

        AlertDecision::Emit(event.clone())
    }

    /// Decide and, on emit, record `now` and the direction in `state`
    pub fn decide(
        &self,
        latest: Option<CrossoverEvent>,
        now: DateTime<Utc>,
        state: &mut DebounceState,
    ) -> AlertDecision {
        let decision = self.evaluate(latest.as_ref(), now, state);

        if let AlertDecision::Emit(event) = &decision {
            state.record(now, event.direction);
        }

        decision
    }
}
