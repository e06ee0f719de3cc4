//! Signal loop
//!
//! Fetch -> compute -> scan -> decide -> notify, repeated on a fixed cadence.
//! A failed cycle is logged and retried after a shorter backoff; only an
//! emitted alert changes the debounce state.

mod clock;
mod signal_loop;

pub use clock::{Clock, Sleeper, SystemClock, TokioSleeper};
pub use signal_loop::{CycleError, CycleOutcome, CyclePhase, LoopConfig, SignalLoop};
