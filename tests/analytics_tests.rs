//! AnalyticsAggregator behaviour behind the circuit breaker

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use linkforge::analytics::{
    ANALYTICS_UNAVAILABLE_MESSAGE, AnalyticsAggregator, AnalyticsSource, CircuitBreaker,
    CircuitState, HttpAnalyticsSource, LinkMetadata, StatsQuery, StatsResult,
};
use linkforge::config::{AnalyticsConfig, CircuitBreakerConfig};

/// Answers from a fixed payload, or fails while `healthy` is false
struct ScriptedSource {
    healthy: AtomicBool,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(healthy: bool) -> Arc<Self> {
        Arc::new(Self {
            healthy: AtomicBool::new(healthy),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalyticsSource for ScriptedSource {
    async fn fetch_stats(&self, query: &StatsQuery) -> anyhow::Result<StatsResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.healthy.load(Ordering::SeqCst) {
            anyhow::bail!("aggregation service returned 503");
        }

        let mut result = StatsResult {
            link_id: query.link_id,
            short_code: String::new(),
            original_url: String::new(),
            total_clicks: 42,
            clicks_by_date: Default::default(),
            clicks_by_browser: Default::default(),
            clicks_by_device_type: Default::default(),
            message: None,
            analytics_available: true,
        };
        result.clicks_by_browser.insert("Firefox".to_string(), 42);
        Ok(result)
    }
}

fn metadata() -> LinkMetadata {
    LinkMetadata {
        short_code: "4C92".to_string(),
        original_url: "https://example.com/a".to_string(),
    }
}

fn breaker(wait_ms: u64) -> Arc<CircuitBreaker> {
    Arc::new(CircuitBreaker::new(
        "analytics",
        CircuitBreakerConfig {
            failure_rate_threshold: 50.0,
            sliding_window_size: 4,
            minimum_calls: 2,
            wait_duration_open_ms: wait_ms,
            permitted_calls_half_open: 1,
        },
        Duration::from_millis(500),
    ))
}

#[tokio::test]
async fn test_passes_through_and_fills_metadata() {
    let source = ScriptedSource::new(true);
    let aggregator = AnalyticsAggregator::new(source.clone(), breaker(1000));

    let stats = aggregator.get_stats(3, &metadata(), 7).await;
    assert!(stats.analytics_available);
    assert_eq!(stats.total_clicks, 42);
    assert_eq!(stats.link_id, 3);
    assert_eq!(stats.short_code, "4C92");
    assert_eq!(stats.original_url, "https://example.com/a");
    assert_eq!(stats.clicks_by_browser.get("Firefox"), Some(&42));
    assert!(stats.message.is_none());
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_failures_degrade_then_short_circuit() {
    let source = ScriptedSource::new(false);
    let aggregator = AnalyticsAggregator::new(source.clone(), breaker(60_000));

    for _ in 0..2 {
        let stats = aggregator.get_stats(3, &metadata(), 7).await;
        assert!(!stats.analytics_available);
        assert_eq!(stats.total_clicks, 0);
        assert_eq!(stats.message.as_deref(), Some(ANALYTICS_UNAVAILABLE_MESSAGE));
    }
    assert_eq!(aggregator.breaker().state(), CircuitState::Open);
    assert_eq!(source.calls(), 2);

    // open: the source is not touched any more
    let stats = aggregator.get_stats(3, &metadata(), 7).await;
    assert!(!stats.analytics_available);
    assert_eq!(stats.short_code, "4C92");
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_recovers_after_cool_down() {
    let source = ScriptedSource::new(true);
    let aggregator = AnalyticsAggregator::new(source.clone(), breaker(30));

    aggregator.breaker().force_open();
    assert!(!aggregator.get_stats(3, &metadata(), 7).await.analytics_available);
    assert_eq!(source.calls(), 0);

    tokio::time::sleep(Duration::from_millis(60)).await;

    let stats = aggregator.get_stats(3, &metadata(), 7).await;
    assert!(stats.analytics_available);
    assert_eq!(aggregator.breaker().state(), CircuitState::Closed);
}

#[tokio::test]
async fn test_unreachable_http_source_degrades() {
    let config = AnalyticsConfig {
        // discard port, nothing listens there
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_ms: 500,
        ..Default::default()
    };
    let source = Arc::new(HttpAnalyticsSource::new(&config.base_url, config.timeout()));
    let aggregator = AnalyticsAggregator::from_config(source, &config);

    let stats = aggregator.get_stats(11, &metadata(), 7).await;
    assert!(!stats.analytics_available);
    assert_eq!(stats.link_id, 11);
    assert_eq!(stats.total_clicks, 0);
    assert_eq!(aggregator.breaker().state(), CircuitState::Closed);
}
