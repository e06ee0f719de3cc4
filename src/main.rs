use anyhow::Context;
use clap::Parser;
use rsi_alert::alert::AlertDebouncer;
use rsi_alert::cli::Cli;
use rsi_alert::config::Config;
use rsi_alert::crossover::CrossoverScanner;
use rsi_alert::feed::BinanceKlineSource;
use rsi_alert::notify::{LogNotifier, NotificationSink, TelegramNotifier};
use rsi_alert::oscillator::OscillatorEngine;
use rsi_alert::runner::{SignalLoop, SystemClock, TokioSleeper};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            Config::parse(include_str!("../config.toml.example"))
                .context("Invalid bundled default config")?
        }
    };
    config.apply_env();
    config.validate(cli.dry_run)?;

    // Initialize telemetry
    let _telemetry = rsi_alert::telemetry::init_telemetry(&config.telemetry)?;

    let source = BinanceKlineSource::new(config.feed.kline_config())?;
    let sink: Box<dyn NotificationSink> = if cli.dry_run {
        Box::new(LogNotifier)
    } else {
        Box::new(TelegramNotifier::new(config.notify.telegram_config()?)?)
    };

    let mut signal_loop = SignalLoop::new(source, sink, SystemClock, TokioSleeper)
        .engine(OscillatorEngine::new(config.oscillator.oscillator_config()))
        .scanner(CrossoverScanner::new(config.scan_config()))
        .debouncer(AlertDebouncer::new(config.alert.debounce_config()))
        .message_format(config.notify.message_format())
        .config(config.schedule.loop_config());

    tracing::info!(
        symbol = %config.feed.symbol,
        interval = %config.feed.interval,
        dry_run = cli.dry_run,
        "Starting crossover alert loop"
    );

    let cycles = signal_loop.run(cli.max_cycles).await;
    tracing::info!(cycles, "Signal loop finished");

    Ok(())
}
