use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::storage::LinkId;

pub const ANALYTICS_UNAVAILABLE_MESSAGE: &str =
    "Analytics temporarily unavailable. URL data is current.";

pub const DEFAULT_STATS_DAYS: u32 = 7;

/// Link data the caller already owns; echoed back in every result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMetadata {
    pub short_code: String,
    pub original_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsQuery {
    pub link_id: LinkId,
    pub short_code: String,
    pub original_url: String,
    /// Window for the per-day breakdown
    pub days: u32,
}

impl StatsQuery {
    pub fn new(link_id: LinkId, metadata: &LinkMetadata, days: u32) -> Self {
        Self {
            link_id,
            short_code: metadata.short_code.clone(),
            original_url: metadata.original_url.clone(),
            days,
        }
    }
}

/// Aggregated click statistics for one link
///
/// Field names on the wire follow the aggregation service
/// (`urlId`, `shortCode`, `totalClicks`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResult {
    #[serde(rename = "urlId", default)]
    pub link_id: LinkId,
    #[serde(default)]
    pub short_code: String,
    #[serde(default)]
    pub original_url: String,
    #[serde(default)]
    pub total_clicks: u64,
    /// `YYYY-MM-DD` -> clicks
    #[serde(default)]
    pub clicks_by_date: BTreeMap<String, u64>,
    #[serde(default)]
    pub clicks_by_browser: BTreeMap<String, u64>,
    #[serde(default)]
    pub clicks_by_device_type: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "default_available")]
    pub analytics_available: bool,
}

fn default_available() -> bool {
    true
}

impl StatsResult {
    pub fn empty(link_id: LinkId, metadata: &LinkMetadata) -> Self {
        Self {
            link_id,
            short_code: metadata.short_code.clone(),
            original_url: metadata.original_url.clone(),
            total_clicks: 0,
            clicks_by_date: BTreeMap::new(),
            clicks_by_browser: BTreeMap::new(),
            clicks_by_device_type: BTreeMap::new(),
            message: None,
            analytics_available: true,
        }
    }

    /// Degraded result: zero counts plus the unavailability marker
    pub fn unavailable(link_id: LinkId, metadata: &LinkMetadata) -> Self {
        Self {
            message: Some(ANALYTICS_UNAVAILABLE_MESSAGE.to_string()),
            analytics_available: false,
            ..Self::empty(link_id, metadata)
        }
    }
}
