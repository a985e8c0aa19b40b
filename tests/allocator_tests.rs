//! CodeAllocator against an in-memory store

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use linkforge::config::{GeneratorConfig, GeneratorStrategy};
use linkforge::errors::{LinkforgeError, Result};
use linkforge::generator::{CodeGenerator, base62};
use linkforge::services::CodeAllocator;
use linkforge::storage::{DeactivateOutcome, Link, LinkStore, NewLink, OwnerId};

/// Store holding links in a map; only existence checks matter here
#[derive(Default)]
struct MemoryStore {
    links: DashMap<String, Link>,
    exists_calls: AtomicUsize,
}

impl MemoryStore {
    fn take(&self, code: &str) {
        let now = Utc::now();
        self.links.insert(
            code.to_string(),
            Link {
                id: self.links.len() as i64 + 1,
                code: code.to_string(),
                target: "https://example.com".to_string(),
                created_at: now,
                expires_at: now,
                active: true,
                click_count: 0,
                owner_id: 1,
            },
        );
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn exists(&self, code: &str) -> Result<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.links.contains_key(code))
    }

    async fn insert(&self, link: NewLink) -> Result<Link> {
        if self.links.contains_key(&link.code) {
            return Err(LinkforgeError::code_conflict(link.code));
        }
        self.take(&link.code);
        self.get(&link.code)
            .await?
            .ok_or_else(|| LinkforgeError::not_found(link.code))
    }

    async fn get(&self, code: &str) -> Result<Option<Link>> {
        Ok(self.links.get(code).map(|l| l.clone()))
    }

    async fn increment_clicks(&self, _code: &str) -> Result<bool> {
        Ok(false)
    }

    async fn deactivate(&self, _code: &str) -> Result<DeactivateOutcome> {
        Ok(DeactivateOutcome::NotFound)
    }

    async fn list_by_owner(&self, _owner_id: OwnerId) -> Result<Vec<Link>> {
        Ok(Vec::new())
    }
}

fn counter(offset: u64) -> CodeGenerator {
    CodeGenerator::from_config(&GeneratorConfig {
        strategy: GeneratorStrategy::Counter,
        counter_offset: offset,
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_first_free_code_is_returned() {
    let store = Arc::new(MemoryStore::default());
    let allocator = CodeAllocator::new(store.clone(), 10);

    let code = allocator.allocate(&counter(1_000_000)).await.unwrap();
    assert_eq!(code, "4C92");
    assert_eq!(store.exists_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_taken_codes_are_skipped() {
    let store = Arc::new(MemoryStore::default());
    for value in 1_000_000..1_000_003 {
        store.take(&base62::encode(value));
    }
    let allocator = CodeAllocator::new(store.clone(), 10);

    let code = allocator.allocate(&counter(1_000_000)).await.unwrap();
    assert_eq!(code, base62::encode(1_000_003));
    assert_eq!(store.exists_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_exhaustion_is_reported() {
    let store = Arc::new(MemoryStore::default());
    for value in 1_000_000..1_000_010 {
        store.take(&base62::encode(value));
    }
    let allocator = CodeAllocator::new(store.clone(), 5);

    let err = allocator.allocate(&counter(1_000_000)).await.unwrap_err();
    assert!(matches!(err, LinkforgeError::AllocationExhausted(_)), "{}", err);
    assert_eq!(store.exists_calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_overlong_code_is_rejected() {
    let store = Arc::new(MemoryStore::default());
    let allocator = CodeAllocator::new(store.clone(), 10);

    // u64::MAX encodes to 11 characters
    let err = allocator.allocate(&counter(u64::MAX)).await.unwrap_err();
    assert!(matches!(err, LinkforgeError::Validation(_)), "{}", err);
    assert_eq!(store.exists_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_allocated_code_is_insertable() {
    let store = Arc::new(MemoryStore::default());
    let allocator = CodeAllocator::new(store.clone(), 10);
    let generator = counter(5_000_000);

    for _ in 0..20 {
        let code = allocator.allocate(&generator).await.unwrap();
        let now = Utc::now();
        store
            .insert(NewLink {
                code,
                target: "https://example.com".to_string(),
                created_at: now,
                expires_at: now,
                owner_id: 1,
            })
            .await
            .unwrap();
    }
    assert_eq!(store.links.len(), 20);
}
