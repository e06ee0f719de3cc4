//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Kline request round trip
    CandleFetch,
    /// Notification delivery round trip
    Notify,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Latest RSI value
    Oscillator,
    /// Latest RSI-EMA value
    Smoothed,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Loop cycles started
    Cycles,
    /// Crossovers seen in scan windows
    CrossoversDetected,
    /// Alerts emitted
    AlertsEmitted,
    /// Alerts held back by the debouncer
    AlertsSuppressed,
    /// Failed notification deliveries
    NotifyFailures,
}

fn latency_name(metric: LatencyMetric) -> &'static str {
    match metric {
        LatencyMetric::CandleFetch => "rsialert_candle_fetch_latency_ms",
        LatencyMetric::Notify => "rsialert_notify_latency_ms",
    }
}

fn gauge_name(metric: GaugeMetric) -> &'static str {
    match metric {
        GaugeMetric::Oscillator => "rsialert_rsi",
        GaugeMetric::Smoothed => "rsialert_rsi_ema",
    }
}

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::Cycles => "rsialert_cycles_total",
        CounterMetric::CrossoversDetected => "rsialert_crossovers_total",
        CounterMetric::AlertsEmitted => "rsialert_alerts_emitted_total",
        CounterMetric::AlertsSuppressed => "rsialert_alerts_suppressed_total",
        CounterMetric::NotifyFailures => "rsialert_notify_failures_total",
    }
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let ms = duration.as_secs_f64() * 1000.0;
    metrics::histogram!(latency_name(metric)).record(ms);
    tracing::trace!(metric = latency_name(metric), value_ms = ms, "Recording latency");
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(gauge_name(metric)).set(value);
}

/// Add to a counter
pub fn increment(metric: CounterMetric, by: u64) {
    metrics::counter!(counter_name(metric)).increment(by);
}

/// Count a failed cycle, labelled with the error kind
pub fn record_cycle_failure(kind: &'static str) {
    metrics::counter!("rsialert_cycle_failures_total", "kind" => kind).increment(1);
}

/// Install the global recorder and serve `/metrics` on `port`.
///
/// Must be called from within a tokio runtime.
pub fn install_prometheus(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;
    Ok(())
}
