use async_trait::async_trait;

use crate::cache::{CacheResult, LinkCache};
use crate::storage::Link;

/// Cache that stores nothing; every lookup goes to the store
pub struct NullLinkCache;

#[async_trait]
impl LinkCache for NullLinkCache {
    async fn get(&self, _code: &str) -> CacheResult {
        CacheResult::Miss
    }

    async fn insert(&self, _link: Link) {}

    async fn remove(&self, _code: &str) {}
}
