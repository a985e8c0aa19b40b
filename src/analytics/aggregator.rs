//! Circuit-breaker-protected statistics lookup
//!
//! `get_stats` never fails: any problem on the analytics side becomes the
//! degraded [`StatsResult::unavailable`] payload.

use std::sync::Arc;

use tracing::{debug, warn};

use super::circuit_breaker::{CallError, CircuitBreaker};
use super::source::AnalyticsSource;
use super::stats::{LinkMetadata, StatsQuery, StatsResult};
use crate::config::AnalyticsConfig;
use crate::storage::LinkId;

pub struct AnalyticsAggregator {
    source: Arc<dyn AnalyticsSource>,
    breaker: Arc<CircuitBreaker>,
}

impl AnalyticsAggregator {
    pub fn new(source: Arc<dyn AnalyticsSource>, breaker: Arc<CircuitBreaker>) -> Self {
        Self { source, breaker }
    }

    pub fn from_config(source: Arc<dyn AnalyticsSource>, config: &AnalyticsConfig) -> Self {
        let breaker = CircuitBreaker::new(
            "analytics",
            config.circuit_breaker.clone(),
            config.timeout(),
        );
        Self::new(source, Arc::new(breaker))
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub async fn get_stats(
        &self,
        link_id: LinkId,
        metadata: &LinkMetadata,
        days: u32,
    ) -> StatsResult {
        let query = StatsQuery::new(link_id, metadata, days.max(1));

        match self.breaker.call(|| self.source.fetch_stats(&query)).await {
            Ok(mut result) => {
                if result.short_code.is_empty() {
                    result.short_code = metadata.short_code.clone();
                }
                if result.original_url.is_empty() {
                    result.original_url = metadata.original_url.clone();
                }
                result
            }
            Err(CallError::Rejected) => {
                debug!(
                    "Analytics circuit open, serving fallback for '{}'",
                    metadata.short_code
                );
                StatsResult::unavailable(link_id, metadata)
            }
            Err(e) => {
                warn!(
                    "Analytics for '{}' unavailable: {}",
                    metadata.short_code, e
                );
                StatsResult::unavailable(link_id, metadata)
            }
        }
    }
}
