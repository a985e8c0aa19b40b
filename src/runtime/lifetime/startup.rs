use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::analytics::{AnalyticsAggregator, AnalyticsSource, ClickTracker, HttpAnalyticsSource};
use crate::cache::create_cache;
use crate::config::{AnalyticsSourceKind, StaticConfig};
use crate::generator::CodeGenerator;
use crate::services::{LinkService, create_owner_directory};
use crate::storage::SeaOrmStorage;

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub link_service: Arc<LinkService>,
    pub tracker: Option<Arc<ClickTracker>>,
}

/// Connect storage and wire every collaborator of [`LinkService`]
///
/// Must run inside a tokio runtime; click tracker workers borrow its handle.
pub async fn prepare_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();

    let storage = Arc::new(
        SeaOrmStorage::connect(&config.database)
            .await
            .context("Failed to create storage backend")?,
    );
    info!("Using storage backend: {}", storage.backend());

    let generator = Arc::new(
        CodeGenerator::from_config(&config.generator).context("Failed to create code generator")?,
    );
    info!("Code generator: {}", generator.strategy());

    let cache = create_cache(&config.cache);
    let owners = create_owner_directory(&config.owners, config.analytics.timeout());

    let source: Arc<dyn AnalyticsSource> = match config.analytics.source {
        AnalyticsSourceKind::Http => Arc::new(HttpAnalyticsSource::new(
            &config.analytics.base_url,
            config.analytics.timeout(),
        )),
        AnalyticsSourceKind::Local => storage.clone(),
    };
    let aggregator = Arc::new(AnalyticsAggregator::from_config(source, &config.analytics));
    debug!("Analytics source: {}", config.analytics.source);

    let mut link_service = LinkService::new(
        storage.clone(),
        cache,
        generator,
        owners,
        aggregator,
        config.links.clone(),
        config.generator.max_allocation_attempts,
    );

    let tracker = if config.click_tracker.enabled {
        let tracker = Arc::new(
            ClickTracker::start(storage.clone(), &config.click_tracker, Handle::current())
                .context("Failed to start click tracker")?,
        );
        link_service = link_service.with_tracker(tracker.clone());
        Some(tracker)
    } else {
        info!("Click tracking disabled");
        None
    };

    debug!("Startup finished in {:?}", start_time.elapsed());
    Ok(StartupContext {
        storage,
        link_service: Arc::new(link_service),
        tracker,
    })
}
