//! Integration tests for the candle feed

use rsi_alert::feed::{BinanceKlineSource, CandleSource, FetchError, KlineConfig};
use std::time::Duration;

#[tokio::test]
async fn test_unreachable_endpoint_is_fetch_error() {
    let source = BinanceKlineSource::new(KlineConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_secs(2),
        ..Default::default()
    })
    .unwrap();

    let err = source.fetch_candles().await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}
