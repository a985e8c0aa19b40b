use super::ClickEvent;

/// Destination of click events
#[async_trait::async_trait]
pub trait ClickSink: Send + Sync {
    async fn record_click(&self, event: ClickEvent) -> anyhow::Result<()>;
}
