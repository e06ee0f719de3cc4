//! Debouncer state and decisions

use crate::crossover::{CrossoverEvent, Direction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Memory of the last accepted alert.
///
/// Lives for the whole process and is only changed when an alert is emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceState {
    pub last_alert_at: Option<DateTime<Utc>>,
    pub last_direction: Option<Direction>,
}

impl DebounceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until the first alert has been emitted
    pub fn is_empty(&self) -> bool {
        self.last_alert_at.is_none() && self.last_direction.is_none()
    }

    pub(super) fn record(&mut self, at: DateTime<Utc>, direction: Direction) {
        self.last_alert_at = Some(at);
        self.last_direction = Some(direction);
    }
}

/// Why an alert was held back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuppressReason {
    /// The scan found no crossover
    NoEvents,
    /// Still inside the cooldown of the previous alert
    Cooldown { until: DateTime<Utc> },
    /// Same direction as the previous alert
    SameDirection(Direction),
}

/// Outcome of a debounce decision
#[derive(Debug, Clone, PartialEq)]
pub enum AlertDecision {
    /// Report this crossover
    Emit(CrossoverEvent),
    /// Stay quiet
    Suppress(SuppressReason),
}

impl AlertDecision {
    pub fn is_emit(&self) -> bool {
        matches!(self, AlertDecision::Emit(_))
    }

    /// The event to report, if any
    pub fn event(&self) -> Option<&CrossoverEvent> {
        match self {
            AlertDecision::Emit(event) => Some(event),
            AlertDecision::Suppress(_) => None,
        }
    }
}
