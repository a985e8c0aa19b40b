//! Local click aggregation over `click_events`
//!
//! Serves as the analytics source when no aggregation service is deployed.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ColumnTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QuerySelect};

use super::SeaOrmStorage;
use crate::analytics::{AnalyticsSource, StatsQuery, StatsResult};
use crate::storage::LinkId;

use migration::entities::click_event;

#[derive(Debug, FromQueryResult)]
pub struct BrowserRow {
    pub browser: Option<String>,
    pub count: i64,
}

#[derive(Debug, FromQueryResult)]
pub struct DeviceRow {
    pub device_type: Option<String>,
    pub count: i64,
}

impl SeaOrmStorage {
    pub async fn count_link_clicks(&self, link_id: LinkId) -> anyhow::Result<u64> {
        click_event::Entity::find()
            .filter(click_event::Column::LinkId.eq(link_id))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Per-day counts (`YYYY-MM-DD`, UTC) since `start`
    pub async fn clicks_by_date(
        &self,
        link_id: LinkId,
        start: DateTime<Utc>,
    ) -> anyhow::Result<BTreeMap<String, u64>> {
        // Bucketed here rather than in SQL: date functions differ per backend
        let timestamps: Vec<DateTime<Utc>> = click_event::Entity::find()
            .select_only()
            .column(click_event::Column::ClickedAt)
            .filter(click_event::Column::LinkId.eq(link_id))
            .filter(click_event::Column::ClickedAt.gte(start))
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut by_date = BTreeMap::new();
        for ts in timestamps {
            *by_date.entry(ts.format("%Y-%m-%d").to_string()).or_insert(0) += 1;
        }
        Ok(by_date)
    }

    pub async fn clicks_by_browser(&self, link_id: LinkId) -> anyhow::Result<BTreeMap<String, u64>> {
        let rows = click_event::Entity::find()
            .select_only()
            .column(click_event::Column::Browser)
            .column_as(click_event::Column::Id.count(), "count")
            .filter(click_event::Column::LinkId.eq(link_id))
            .group_by(click_event::Column::Browser)
            .into_model::<BrowserRow>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.browser.map(|b| (b, row.count.max(0) as u64)))
            .collect())
    }

    pub async fn clicks_by_device_type(
        &self,
        link_id: LinkId,
    ) -> anyhow::Result<BTreeMap<String, u64>> {
        let rows = click_event::Entity::find()
            .select_only()
            .column(click_event::Column::DeviceType)
            .column_as(click_event::Column::Id.count(), "count")
            .filter(click_event::Column::LinkId.eq(link_id))
            .group_by(click_event::Column::DeviceType)
            .into_model::<DeviceRow>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.device_type.map(|d| (d, row.count.max(0) as u64)))
            .collect())
    }
}

#[async_trait]
impl AnalyticsSource for SeaOrmStorage {
    async fn fetch_stats(&self, query: &StatsQuery) -> anyhow::Result<StatsResult> {
        let start = Utc::now() - Duration::days(i64::from(query.days));

        Ok(StatsResult {
            link_id: query.link_id,
            short_code: query.short_code.clone(),
            original_url: query.original_url.clone(),
            total_clicks: self.count_link_clicks(query.link_id).await?,
            clicks_by_date: self.clicks_by_date(query.link_id, start).await?,
            clicks_by_browser: self.clicks_by_browser(query.link_id).await?,
            clicks_by_device_type: self.clicks_by_device_type(query.link_id).await?,
            message: None,
            analytics_available: true,
        })
    }
}
