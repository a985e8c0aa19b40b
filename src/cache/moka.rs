use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::cache::{CacheResult, LinkCache};
use crate::config::CacheConfig;
use crate::storage::Link;

/// Entry lifetime is the configured TTL, capped by the link's own expiry
struct LinkExpiry {
    default_ttl: Duration,
}

impl Expiry<String, Link> for LinkExpiry {
    fn expire_after_create(&self, _key: &String, value: &Link, _created_at: Instant) -> Option<Duration> {
        let now = chrono::Utc::now();
        if value.expires_at <= now {
            // already expired, keep just long enough to answer Expired
            return Some(Duration::from_secs(1));
        }
        let remaining = (value.expires_at - now)
            .to_std()
            .unwrap_or(Duration::from_secs(1));
        Some(remaining.min(self.default_ttl))
    }
}

pub struct MokaLinkCache {
    inner: Cache<String, Link>,
}

impl MokaLinkCache {
    pub fn new(config: &CacheConfig) -> Self {
        let default_ttl = Duration::from_secs(config.default_ttl);

        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(LinkExpiry { default_ttl })
            .build();

        debug!(
            "MokaLinkCache initialized with max capacity: {}, default TTL: {}s",
            config.max_capacity, config.default_ttl
        );
        Self { inner }
    }
}

#[async_trait]
impl LinkCache for MokaLinkCache {
    async fn get(&self, code: &str) -> CacheResult {
        match self.inner.get(code).await {
            Some(link) => CacheResult::Found(link),
            None => CacheResult::Miss,
        }
    }

    async fn insert(&self, link: Link) {
        self.inner.insert(link.code.clone(), link).await;
    }

    async fn remove(&self, code: &str) {
        self.inner.invalidate(code).await;
    }
}
