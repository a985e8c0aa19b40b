pub mod moka;
pub mod null;
pub mod traits;

use std::sync::Arc;

use tracing::info;

use crate::config::{CacheConfig, CacheType};

pub use self::moka::MokaLinkCache;
pub use null::NullLinkCache;
pub use traits::{CacheResult, LinkCache};

/// Build the cache selected by `[cache] type`
pub fn create_cache(config: &CacheConfig) -> Arc<dyn LinkCache> {
    info!("Using {} link cache", config.cache_type);
    match config.cache_type {
        CacheType::Memory => Arc::new(MokaLinkCache::new(config)),
        CacheType::Null => Arc::new(NullLinkCache),
    }
}
