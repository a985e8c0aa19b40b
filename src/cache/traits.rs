use async_trait::async_trait;

use crate::storage::Link;

/// Cache lookup result
#[derive(Debug, Clone)]
pub enum CacheResult {
    Found(Link),
    /// Not cached; the store decides
    Miss,
}

/// Read-through cache in front of the link store
///
/// Entries are whole [`Link`] records keyed by code. The cache never answers
/// "does not exist"; every miss falls through to the store.
#[async_trait]
pub trait LinkCache: Send + Sync {
    async fn get(&self, code: &str) -> CacheResult;
    async fn insert(&self, link: Link);
    async fn remove(&self, code: &str);
}
