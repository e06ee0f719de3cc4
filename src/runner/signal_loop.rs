//! Polling state machine

use super::clock::{Clock, Sleeper};
use crate::alert::{AlertDebouncer, AlertDecision, DebounceState};
use crate::crossover::{CrossoverEvent, CrossoverScanner};
use crate::feed::{CandleSource, FetchError};
use crate::notify::{format_alert, MessageFormat, NotificationSink, NotifyError};
use crate::oscillator::{InsufficientData, OscillatorEngine};
use crate::telemetry::{self, CounterMetric, GaugeMetric, LatencyMetric};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Loop cadence
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Delay after a successful cycle (default: 10 seconds)
    pub poll_interval: Duration,
    /// Delay after a failed cycle (default: 5 seconds)
    pub backoff: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            backoff: Duration::from_secs(5),
        }
    }
}

/// Where the loop currently is within a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Fetching,
    Computing,
    Scanning,
    Deciding,
    Notifying,
    Idle,
    Sleeping,
}

/// Failure of a single cycle
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    InsufficientData(#[from] InsufficientData),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl CycleError {
    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            CycleError::Fetch(_) => "fetch",
            CycleError::InsufficientData(_) => "insufficient_data",
            CycleError::Notify(_) => "notify",
        }
    }
}

/// Summary of a successful cycle
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// Candles received from the source
    pub candles: usize,
    /// Crossovers found in the scan window
    pub crossovers: Vec<CrossoverEvent>,
    /// What the debouncer made of the latest crossover
    pub decision: AlertDecision,
}

/// Fetch/compute/scan/decide/notify loop over one instrument
pub struct SignalLoop<S, N, C, Z> {
    source: S,
    sink: N,
    clock: C,
    sleeper: Z,
    engine: OscillatorEngine,
    scanner: CrossoverScanner,
    debouncer: AlertDebouncer,
    format: MessageFormat,
    config: LoopConfig,
    state: DebounceState,
    phase: CyclePhase,
}

impl<S, N, C, Z> SignalLoop<S, N, C, Z>
where
    S: CandleSource,
    N: NotificationSink,
    C: Clock,
    Z: Sleeper,
{
    /// Create a loop with default engine, scanner, debouncer and cadence
    pub fn new(source: S, sink: N, clock: C, sleeper: Z) -> Self {
        Self {
            source,
            sink,
            clock,
            sleeper,
            engine: OscillatorEngine::default(),
            scanner: CrossoverScanner::default(),
            debouncer: AlertDebouncer::default(),
            format: MessageFormat::default(),
            config: LoopConfig::default(),
            state: DebounceState::default(),
            phase: CyclePhase::Idle,
        }
    }

    pub fn engine(mut self, engine: OscillatorEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn scanner(mut self, scanner: CrossoverScanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn debouncer(mut self, debouncer: AlertDebouncer) -> Self {
        self.debouncer = debouncer;
        self
    }

    pub fn message_format(mut self, format: MessageFormat) -> Self {
        self.format = format;
        self
    }

    pub fn config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    /// Current debounce state
    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Run one cycle.
    ///
    /// The debounce state is committed as soon as the decision is to emit,
    /// before delivery; a failed delivery is not retried.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, CycleError> {
        self.phase = CyclePhase::Fetching;
        let started = Instant::now();
        let candles = self.source.fetch_candles().await?;
        telemetry::record_latency(LatencyMetric::CandleFetch, started.elapsed());

        self.phase = CyclePhase::Computing;
        let series = self.engine.series(&candles)?;
        if let Some(last) = series.last() {
            if let Some(value) = last.oscillator {
                telemetry::set_gauge(GaugeMetric::Oscillator, value);
            }
            if let Some(value) = last.smoothed {
                telemetry::set_gauge(GaugeMetric::Smoothed, value);
            }
        }

        self.phase = CyclePhase::Scanning;
        let crossovers: Vec<CrossoverEvent> = self.scanner.scan(&candles, &series).collect();
        for event in &crossovers {
            tracing::debug!(
                timestamp = %event.timestamp,
                price = %event.signal_price,
                price_diff = %event.price_difference,
                direction = %event.direction,
                "Crossover in window"
            );
        }
        telemetry::increment(CounterMetric::CrossoversDetected, crossovers.len() as u64);

        self.phase = CyclePhase::Deciding;
        let now = self.clock.now();
        let decision = self
            .debouncer
            .decide(crossovers.last().cloned(), now, &mut self.state);

        match &decision {
            AlertDecision::Emit(event) => {
                self.phase = CyclePhase::Notifying;
                tracing::info!(
                    timestamp = %event.timestamp,
                    price = %event.signal_price,
                    direction = %event.direction,
                    "Emitting crossover alert"
                );
                telemetry::increment(CounterMetric::AlertsEmitted, 1);

                let message = format_alert(event, &self.format);
                let started = Instant::now();
                let delivered = self.sink.send(&message).await;
                telemetry::record_latency(LatencyMetric::Notify, started.elapsed());
                if delivered.is_err() {
                    telemetry::increment(CounterMetric::NotifyFailures, 1);
                }
                delivered?;
            }
            AlertDecision::Suppress(reason) => {
                self.phase = CyclePhase::Idle;
                tracing::debug!(?reason, "Alert suppressed");
                telemetry::increment(CounterMetric::AlertsSuppressed, 1);
            }
        }

        Ok(CycleOutcome {
            candles: candles.len(),
            crossovers,
            decision,
        })
    }

    /// Run cycles until `max_cycles` is reached, or forever when `None`.
    ///
    /// Returns the number of cycles run. No cycle failure ends the loop.
    pub async fn run(&mut self, max_cycles: Option<u64>) -> u64 {
        let mut cycles = 0u64;
        if max_cycles == Some(0) {
            return cycles;
        }

        loop {
            cycles += 1;
            telemetry::increment(CounterMetric::Cycles, 1);

            let delay = match self.run_cycle().await {
                Ok(outcome) => {
                    tracing::trace!(
                        candles = outcome.candles,
                        crossovers = outcome.crossovers.len(),
                        "Cycle complete"
                    );
                    self.config.poll_interval
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        kind = e.kind(),
                        phase = ?self.phase,
                        "Cycle failed, backing off"
                    );
                    telemetry::record_cycle_failure(e.kind());
                    self.config.backoff
                }
            };

            if max_cycles.is_some_and(|max| cycles >= max) {
                break;
            }

            self.phase = CyclePhase::Sleeping;
            self.sleeper.sleep(delay).await;
        }

        cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossover::Direction;
    use crate::feed::Candle;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    /// 42 candles whose RSI crosses its EMA at index 40
    fn crossing_candles(direction: Direction) -> Vec<Candle> {
        let (start, step) = match direction {
            Direction::Bullish => (200i64, -1i64),
            Direction::Bearish => (100i64, 1i64),
        };
        let mut closes: Vec<i64> = (0..40).map(|i| start + step * i).collect();
        let last = *closes.last().unwrap();
        closes.push(last - step * 10);
        closes.push(last - step * 12);

        closes
            .into_iter()
            .enumerate()
            .map(|(i, close)| {
                let close = Decimal::from(close);
                Candle::new(
                    t0() - ChronoDuration::minutes(5 * (42 - i as i64)),
                    close,
                    close + Decimal::ONE,
                    close - Decimal::ONE,
                    close,
                    Decimal::ONE,
                )
            })
            .collect()
    }

    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Vec<Candle>, FetchError>>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Vec<Candle>, FetchError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait]
    impl CandleSource for ScriptedSource {
        async fn fetch_candles(&self) -> Result<Vec<Candle>, FetchError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Malformed("script exhausted".to_string())))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        sent: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn send(&self, message: &str) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(message.to_string());
            if self.fail {
                return Err(NotifyError::Rejected {
                    status: 500,
                    description: "down".to_string(),
                });
            }
            Ok(())
        }
    }

    #[derive(Clone)]
    struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    /// Advances the manual clock instead of waiting
    #[derive(Clone)]
    struct AdvancingSleeper {
        clock: ManualClock,
        slept: Arc<Mutex<Vec<Duration>>>,
    }

    #[async_trait]
    impl Sleeper for AdvancingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
            let mut now = self.clock.0.lock().unwrap();
            *now += ChronoDuration::from_std(duration).unwrap();
        }
    }

    fn harness(
        responses: Vec<Result<Vec<Candle>, FetchError>>,
        sink: RecordingSink,
    ) -> (
        SignalLoop<ScriptedSource, RecordingSink, ManualClock, AdvancingSleeper>,
        Arc<Mutex<Vec<Duration>>>,
    ) {
        let clock = ManualClock(Arc::new(Mutex::new(t0())));
        let slept = Arc::new(Mutex::new(Vec::new()));
        let sleeper = AdvancingSleeper {
            clock: clock.clone(),
            slept: slept.clone(),
        };
        let signal_loop = SignalLoop::new(ScriptedSource::new(responses), sink, clock, sleeper);
        (signal_loop, slept)
    }

    #[tokio::test]
    async fn test_cycle_emits_bullish_alert() {
        let sink = RecordingSink::default();
        let (mut signal_loop, _) =
            harness(vec![Ok(crossing_candles(Direction::Bullish))], sink.clone());

        let outcome = signal_loop.run_cycle().await.unwrap();

        assert_eq!(outcome.candles, 42);
        assert_eq!(outcome.crossovers.len(), 1);
        assert!(outcome.decision.is_emit());
        assert_eq!(signal_loop.phase(), CyclePhase::Notifying);
        assert_eq!(signal_loop.state().last_direction, Some(Direction::Bullish));
        assert_eq!(signal_loop.state().last_alert_at, Some(t0()));

        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Action: Bullish Crossover (Buy)"));
    }

    #[tokio::test]
    async fn test_cycle_emits_bearish_alert() {
        let sink = RecordingSink::default();
        let (mut signal_loop, _) =
            harness(vec![Ok(crossing_candles(Direction::Bearish))], sink.clone());

        let outcome = signal_loop.run_cycle().await.unwrap();

        let event = outcome.decision.event().unwrap();
        assert!(event.is_bearish());
        // drop 139 -> 129, next candle closes 127 with low 126
        assert_eq!(event.signal_price, Decimal::from(129));
        assert_eq!(event.price_difference, Decimal::from(3));
    }

    #[tokio::test]
    async fn test_repeated_scan_alerts_once() {
        let sink = RecordingSink::default();
        let candles = crossing_candles(Direction::Bullish);
        let (mut signal_loop, slept) = harness(
            vec![Ok(candles.clone()), Ok(candles.clone()), Ok(candles)],
            sink.clone(),
        );

        let cycles = signal_loop.run(Some(3)).await;

        assert_eq!(cycles, 3);
        assert_eq!(sink.sent.lock().unwrap().len(), 1);
        assert_eq!(
            *slept.lock().unwrap(),
            vec![Duration::from_secs(10), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_backs_off_and_recovers() {
        let sink = RecordingSink::default();
        let (mut signal_loop, slept) = harness(
            vec![
                Err(FetchError::Status {
                    status: 503,
                    body: String::new(),
                }),
                Ok(crossing_candles(Direction::Bearish)),
            ],
            sink.clone(),
        );

        signal_loop.run(Some(2)).await;

        assert_eq!(*slept.lock().unwrap(), vec![Duration::from_secs(5)]);
        assert_eq!(sink.sent.lock().unwrap().len(), 1);
        assert_eq!(
            signal_loop.state().last_alert_at,
            Some(t0() + ChronoDuration::seconds(5))
        );
    }

    #[tokio::test]
    async fn test_insufficient_data_leaves_state_untouched() {
        let sink = RecordingSink::default();
        let short = crossing_candles(Direction::Bullish)[..10].to_vec();
        let (mut signal_loop, _) = harness(vec![Ok(short)], sink.clone());

        let err = signal_loop.run_cycle().await.unwrap_err();

        assert_eq!(err.kind(), "insufficient_data");
        assert_eq!(signal_loop.phase(), CyclePhase::Computing);
        assert!(signal_loop.state().is_empty());
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notify_failure_is_not_retried() {
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let candles = crossing_candles(Direction::Bullish);
        let (mut signal_loop, slept) =
            harness(vec![Ok(candles.clone()), Ok(candles)], sink.clone());

        let err = signal_loop.run_cycle().await.unwrap_err();
        assert_eq!(err.kind(), "notify");
        assert_eq!(signal_loop.state().last_direction, Some(Direction::Bullish));

        let outcome = signal_loop.run_cycle().await.unwrap();
        assert!(!outcome.decision.is_emit());
        assert_eq!(sink.sent.lock().unwrap().len(), 1);
        assert!(slept.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_direction_change_after_cooldown_alerts_again() {
        let sink = RecordingSink::default();
        let mut responses = vec![Ok(crossing_candles(Direction::Bullish))];
        // 30 cycles at 10s = 5 minutes
        responses.extend((0..30).map(|_| Ok(crossing_candles(Direction::Bearish))));
        let (mut signal_loop, _) = harness(responses, sink.clone());

        signal_loop.run(Some(31)).await;

        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].contains("Bearish"));
        assert_eq!(
            signal_loop.state().last_alert_at,
            Some(t0() + ChronoDuration::minutes(5))
        );
    }

    #[test]
    fn test_cycle_error_kinds() {
        let fetch: CycleError = FetchError::Malformed("x".to_string()).into();
        assert_eq!(fetch.kind(), "fetch");

        let data: CycleError = InsufficientData {
            required: 15,
            available: 2,
        }
        .into();
        assert_eq!(data.kind(), "insufficient_data");
        assert_eq!(data.to_string(), "Insufficient data: need at least 15 candles, got 2");
    }
}
