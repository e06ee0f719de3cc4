//! Alert debouncing
//!
//! Decides whether the latest crossover of a scan is worth a notification:
//! a cooldown after every alert, and only direction changes are reported.

mod debouncer;
mod types;

pub use debouncer::{AlertDebouncer, DebounceConfig};
pub use types::{AlertDecision, DebounceState, SuppressReason};
