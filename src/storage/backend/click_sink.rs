//! ClickSink implementation for SeaOrmStorage

use async_trait::async_trait;
use sea_orm::{ActiveValue::Set, EntityTrait};
use tracing::trace;

use super::SeaOrmStorage;
use super::retry;
use crate::analytics::{ClickEvent, ClickSink};

use migration::entities::click_event;

#[async_trait]
impl ClickSink for SeaOrmStorage {
    async fn record_click(&self, event: ClickEvent) -> anyhow::Result<()> {
        let model = click_event::ActiveModel {
            link_id: Set(event.link_id),
            clicked_at: Set(event.clicked_at),
            ip_address: Set(event.ip_address),
            user_agent: Set(event.user_agent),
            referrer: Set(event.referrer),
            browser: Set(Some(event.browser)),
            device_type: Set(Some(event.device_type)),
            ..Default::default()
        };

        click_event::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(|e| retry::classify(self.backend, "record_click", e))?;

        trace!(
            "Click event written to {} (link {})",
            self.backend, event.link_id
        );
        Ok(())
    }
}
