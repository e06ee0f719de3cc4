//! End-to-end signal scenarios

use chrono::{DateTime, Duration, TimeZone, Utc};
use rsi_alert::alert::{AlertDebouncer, AlertDecision, DebounceState, SuppressReason};
use rsi_alert::config::Config;
use rsi_alert::crossover::{CrossoverEvent, CrossoverScanner, Direction};
use rsi_alert::feed::Candle;
use rsi_alert::notify::format_alert;
use rsi_alert::oscillator::{OscillatorEngine, SeriesPoint};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn flat_candles(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            Candle::new(
                t0() + Duration::minutes(5 * i as i64),
                dec!(100),
                dec!(101),
                dec!(99),
                dec!(100),
                dec!(1),
            )
        })
        .collect()
}

/// 14 warm-up points, then the given (rsi, ema) pairs
fn series(pairs: &[(f64, f64)]) -> Vec<SeriesPoint> {
    (0..14)
        .map(|_| (None, None))
        .chain(pairs.iter().map(|&(o, s)| (Some(o), Some(s))))
        .enumerate()
        .map(|(i, (oscillator, smoothed))| SeriesPoint {
            timestamp: t0() + Duration::minutes(5 * i as i64),
            oscillator,
            smoothed,
        })
        .collect()
}

fn event(direction: Direction, at: DateTime<Utc>) -> CrossoverEvent {
    CrossoverEvent {
        timestamp: at,
        signal_price: dec!(100),
        price_difference: dec!(1),
        direction,
    }
}

#[test]
fn test_scenario_a_bullish_cross_valued_on_next_high() {
    let series = series(&[(45.0, 50.0), (48.0, 50.0), (52.0, 50.0), (51.0, 50.0)]);
    let mut candles = flat_candles(series.len());
    candles[16].close = dec!(100);
    candles[17].high = dec!(105);

    let events: Vec<_> = CrossoverScanner::with_defaults()
        .scan(&candles, &series)
        .collect();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].direction, Direction::Bullish);
    assert_eq!(events[0].signal_price, dec!(100));
    assert_eq!(events[0].price_difference, dec!(5));
}

#[test]
fn test_scenario_b_opposite_events_only_latest_alerts() {
    let series = series(&[(55.0, 50.0), (45.0, 50.0), (55.0, 50.0), (56.0, 50.0)]);
    let candles = flat_candles(series.len());
    let scanner = CrossoverScanner::with_defaults();

    let events: Vec<_> = scanner.scan(&candles, &series).collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].direction, Direction::Bearish);
    assert_eq!(events[1].direction, Direction::Bullish);

    // The bearish event was alerted in an earlier cycle
    let debouncer = AlertDebouncer::with_defaults();
    let mut state = DebounceState::new();
    let earlier = debouncer.decide(Some(events[0].clone()), t0(), &mut state);
    assert!(earlier.is_emit());

    let now = t0() + Duration::minutes(10);
    let bearish_again = debouncer.decide(Some(events[0].clone()), now, &mut state);
    assert_eq!(
        bearish_again,
        AlertDecision::Suppress(SuppressReason::SameDirection(Direction::Bearish))
    );

    let latest = scanner.latest(&candles, &series);
    let decision = debouncer.decide(latest, now + Duration::minutes(2), &mut state);
    assert_eq!(decision.event().map(|e| e.direction), Some(Direction::Bullish));
    assert_eq!(state.last_direction, Some(Direction::Bullish));
}

#[test]
fn test_scenario_c_same_direction_one_minute_apart() {
    let debouncer = AlertDebouncer::with_defaults();
    let mut state = DebounceState::new();

    let first = debouncer.decide(Some(event(Direction::Bearish, t0())), t0(), &mut state);
    let second = debouncer.decide(
        Some(event(Direction::Bearish, t0() + Duration::minutes(1))),
        t0() + Duration::minutes(1),
        &mut state,
    );

    assert!(first.is_emit());
    assert!(!second.is_emit());
    assert_eq!(state.last_alert_at, Some(t0()));
}

#[test]
fn test_pipeline_from_closes_to_message() {
    // steady rise pins rsi and its ema at 100, then a sharp drop crosses down
    let mut closes: Vec<i64> = (0..40).map(|i| 100 + i).collect();
    closes.push(129);
    closes.push(127);

    let candles: Vec<Candle> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let close = Decimal::from(close);
            Candle::new(
                t0() + Duration::minutes(5 * i as i64),
                close,
                close + Decimal::ONE,
                close - Decimal::ONE,
                close,
                Decimal::ONE,
            )
        })
        .collect();

    let config = Config::default();
    let engine = OscillatorEngine::new(config.oscillator.oscillator_config());
    let scanner = CrossoverScanner::new(config.scan_config());
    let debouncer = AlertDebouncer::new(config.alert.debounce_config());

    let series = engine.series(&candles).unwrap();
    let latest = scanner.latest(&candles, &series).unwrap();
    assert_eq!(latest.direction, Direction::Bearish);
    assert_eq!(latest.timestamp, candles[40].timestamp);

    let mut state = DebounceState::new();
    let decision = debouncer.decide(Some(latest), t0() + Duration::hours(4), &mut state);
    let message = format_alert(decision.event().unwrap(), &config.notify.message_format());

    assert!(message.starts_with("**BTC TRADE Alert**\n"));
    assert!(message.contains("Price: 129.00"));
    assert!(message.contains("Action: Bearish Crossover (Sell)"));
    assert!(message.contains("Price Diff: 3.00"));
}

#[test]
fn test_engine_rejects_short_history() {
    let candles = flat_candles(14);
    let err = OscillatorEngine::with_defaults()
        .series(&candles)
        .unwrap_err();
    assert_eq!(err.required, 15);
}
