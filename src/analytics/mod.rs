//! Click tracking and click statistics
//!
//! - `tracker`: fire-and-forget recording of resolution events
//! - `aggregator`: statistics behind a circuit breaker with a degraded fallback

pub mod aggregator;
pub mod circuit_breaker;
pub mod sink;
pub mod source;
pub mod stats;
pub mod tracker;
pub mod user_agent;

pub use aggregator::AnalyticsAggregator;
pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use sink::ClickSink;
pub use source::{AnalyticsSource, HttpAnalyticsSource};
pub use stats::{ANALYTICS_UNAVAILABLE_MESSAGE, LinkMetadata, StatsQuery, StatsResult};
pub use tracker::ClickTracker;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::LinkId;

/// Raw data captured on the resolution path
#[derive(Debug, Clone)]
pub struct ClickDetail {
    pub link_id: LinkId,
    pub code: String,
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

impl ClickDetail {
    pub fn new(link_id: LinkId, code: impl Into<String>) -> Self {
        Self {
            link_id,
            code: code.into(),
            timestamp: Utc::now(),
            ip_address: None,
            user_agent: None,
            referrer: None,
        }
    }
}

/// A click as persisted, with fields derived from the user agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub link_id: LinkId,
    pub clicked_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub browser: String,
    pub device_type: String,
}

impl From<ClickDetail> for ClickEvent {
    fn from(detail: ClickDetail) -> Self {
        let parsed = user_agent::parse(detail.user_agent.as_deref());
        Self {
            link_id: detail.link_id,
            clicked_at: detail.timestamp,
            ip_address: detail.ip_address,
            user_agent: detail.user_agent,
            referrer: detail.referrer,
            browser: parsed.browser,
            device_type: parsed.device_type,
        }
    }
}
