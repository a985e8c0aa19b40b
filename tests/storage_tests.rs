//! Storage backend tests
//!
//! SeaOrmStorage against throwaway SQLite databases.

use std::sync::Arc;

use chrono::{Duration, Utc};
use linkforge::analytics::{AnalyticsSource, ClickEvent, ClickSink, LinkMetadata, StatsQuery};
use linkforge::config::DatabaseConfig;
use linkforge::errors::LinkforgeError;
use linkforge::storage::{Backend, DeactivateOutcome, LinkStore, NewLink, SeaOrmStorage};
use tempfile::TempDir;

async fn create_temp_storage() -> (SeaOrmStorage, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };

    let storage = SeaOrmStorage::connect(&config)
        .await
        .expect("Failed to create storage");
    (storage, temp_dir)
}

fn new_link(code: &str, owner_id: i64) -> NewLink {
    let now = Utc::now();
    NewLink {
        code: code.to_string(),
        target: format!("https://{}.example.com", code),
        created_at: now,
        expires_at: now + Duration::days(7),
        owner_id,
    }
}

fn click(link_id: i64, days_ago: i64, browser: &str, device: &str) -> ClickEvent {
    ClickEvent {
        link_id,
        clicked_at: Utc::now() - Duration::days(days_ago),
        ip_address: Some("203.0.113.7".to_string()),
        user_agent: None,
        referrer: None,
        browser: browser.to_string(),
        device_type: device.to_string(),
    }
}

#[tokio::test]
async fn test_insert_and_get() {
    let (storage, _dir) = create_temp_storage().await;
    assert_eq!(storage.backend(), Backend::Sqlite);

    assert!(!storage.exists("abc").await.unwrap());
    let link = storage.insert(new_link("abc", 1)).await.unwrap();
    assert!(link.id > 0);
    assert!(link.active);
    assert_eq!(link.click_count, 0);

    assert!(storage.exists("abc").await.unwrap());
    let fetched = storage.get("abc").await.unwrap().unwrap();
    assert_eq!(fetched.target, "https://abc.example.com");
    assert_eq!(fetched.owner_id, 1);
    assert!(storage.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_code_is_conflict() {
    let (storage, _dir) = create_temp_storage().await;
    storage.insert(new_link("dup", 1)).await.unwrap();

    let err = storage.insert(new_link("dup", 2)).await.unwrap_err();
    assert!(matches!(err, LinkforgeError::CodeConflict(_)), "{}", err);

    // the original row is untouched
    assert_eq!(storage.get("dup").await.unwrap().unwrap().owner_id, 1);
}

#[tokio::test]
async fn test_increment_clicks() {
    let (storage, _dir) = create_temp_storage().await;
    storage.insert(new_link("hits", 1)).await.unwrap();

    assert!(storage.increment_clicks("hits").await.unwrap());
    assert!(storage.increment_clicks("hits").await.unwrap());
    assert!(!storage.increment_clicks("nope").await.unwrap());

    assert_eq!(storage.get("hits").await.unwrap().unwrap().click_count, 2);
}

#[tokio::test]
async fn test_increment_skips_inactive_link() {
    let (storage, _dir) = create_temp_storage().await;
    storage.insert(new_link("gone", 1)).await.unwrap();
    assert!(storage.increment_clicks("gone").await.unwrap());

    storage.deactivate("gone").await.unwrap();
    assert!(!storage.increment_clicks("gone").await.unwrap());

    let link = storage.get("gone").await.unwrap().unwrap();
    assert!(!link.active);
    assert_eq!(link.click_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_increments_are_not_lost() {
    let (storage, _dir) = create_temp_storage().await;
    let storage = Arc::new(storage);
    storage.insert(new_link("busy", 1)).await.unwrap();

    let tasks: Vec<_> = (0..40)
        .map(|_| {
            let storage = storage.clone();
            tokio::spawn(async move { storage.increment_clicks("busy").await })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().unwrap());
    }

    assert_eq!(storage.get("busy").await.unwrap().unwrap().click_count, 40);
}

#[tokio::test]
async fn test_deactivate_outcomes() {
    let (storage, _dir) = create_temp_storage().await;
    storage.insert(new_link("off", 1)).await.unwrap();

    assert_eq!(
        storage.deactivate("off").await.unwrap(),
        DeactivateOutcome::Deactivated
    );
    assert_eq!(
        storage.deactivate("off").await.unwrap(),
        DeactivateOutcome::AlreadyInactive
    );
    assert_eq!(
        storage.deactivate("ghost").await.unwrap(),
        DeactivateOutcome::NotFound
    );
    assert!(!storage.get("off").await.unwrap().unwrap().active);
}

#[tokio::test]
async fn test_list_by_owner_newest_first() {
    let (storage, _dir) = create_temp_storage().await;
    let base = Utc::now();

    for (i, code) in ["old", "mid", "new"].iter().enumerate() {
        let mut link = new_link(code, 5);
        link.created_at = base + Duration::seconds(i as i64);
        storage.insert(link).await.unwrap();
    }
    storage.insert(new_link("other", 6)).await.unwrap();

    let codes: Vec<String> = storage
        .list_by_owner(5)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.code)
        .collect();
    assert_eq!(codes, vec!["new", "mid", "old"]);
    assert!(storage.list_by_owner(99).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_local_analytics_aggregation() {
    let (storage, _dir) = create_temp_storage().await;
    let link = storage.insert(new_link("stats", 1)).await.unwrap();
    let other = storage.insert(new_link("noise", 1)).await.unwrap();

    storage.record_click(click(link.id, 0, "Chrome", "pc")).await.unwrap();
    storage.record_click(click(link.id, 0, "Chrome", "smartphone")).await.unwrap();
    storage.record_click(click(link.id, 1, "Firefox", "pc")).await.unwrap();
    // outside the 7 day window, still part of the all-time totals
    storage.record_click(click(link.id, 30, "Safari", "pc")).await.unwrap();
    storage.record_click(click(other.id, 0, "Chrome", "pc")).await.unwrap();

    let metadata = LinkMetadata {
        short_code: link.code.clone(),
        original_url: link.target.clone(),
    };
    let stats = storage
        .fetch_stats(&StatsQuery::new(link.id, &metadata, 7))
        .await
        .unwrap();

    assert!(stats.analytics_available);
    assert_eq!(stats.link_id, link.id);
    assert_eq!(stats.short_code, "stats");
    assert_eq!(stats.total_clicks, 4);
    assert_eq!(stats.clicks_by_date.values().sum::<u64>(), 3);
    let today = Utc::now().format("%Y-%m-%d").to_string();
    assert_eq!(stats.clicks_by_date.get(&today), Some(&2));
    assert_eq!(stats.clicks_by_browser.get("Chrome"), Some(&2));
    assert_eq!(stats.clicks_by_browser.get("Safari"), Some(&1));
    assert_eq!(stats.clicks_by_device_type.get("pc"), Some(&3));
    assert_eq!(stats.clicks_by_device_type.get("smartphone"), Some(&1));
}
