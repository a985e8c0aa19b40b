//! Link lifecycle: creation, resolution, deactivation, listing and stats
//!
//! Every collaborator is handed in explicitly; the service holds no global
//! state of its own.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::allocator::CodeAllocator;
use super::owner::OwnerDirectory;
use crate::analytics::{
    AnalyticsAggregator, ClickDetail, ClickTracker, LinkMetadata, StatsResult,
    stats::DEFAULT_STATS_DAYS,
};
use crate::cache::{CacheResult, LinkCache};
use crate::config::LinksConfig;
use crate::errors::{LinkforgeError, Result};
use crate::generator::CodeGenerator;
use crate::storage::{DeactivateOutcome, Link, LinkStore, NewLink, OwnerId};
use crate::utils::validate_url;

// ============ Request/Response DTOs ============

#[derive(Debug, Clone)]
pub struct CreateLinkRequest {
    pub target: String,
    /// Falls back to `links.default_expiry_days`
    pub expiration_days: Option<u32>,
    /// Username, resolved through the owner directory
    pub owner: String,
}

/// What the caller knows about the visitor
#[derive(Debug, Clone, Default)]
pub struct ClickContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub code: String,
    pub destination: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub click_count: u64,
    pub active: bool,
    pub owner_id: OwnerId,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            code: link.code,
            destination: link.target,
            created_at: link.created_at,
            expires_at: link.expires_at,
            click_count: link.click_count,
            active: link.active,
            owner_id: link.owner_id,
        }
    }
}

// ============ LinkService Implementation ============

pub struct LinkService {
    store: Arc<dyn LinkStore>,
    cache: Arc<dyn LinkCache>,
    allocator: CodeAllocator,
    generator: Arc<CodeGenerator>,
    owners: Arc<dyn OwnerDirectory>,
    tracker: Option<Arc<ClickTracker>>,
    aggregator: Arc<AnalyticsAggregator>,
    config: LinksConfig,
}

impl LinkService {
    pub fn new(
        store: Arc<dyn LinkStore>,
        cache: Arc<dyn LinkCache>,
        generator: Arc<CodeGenerator>,
        owners: Arc<dyn OwnerDirectory>,
        aggregator: Arc<AnalyticsAggregator>,
        config: LinksConfig,
        max_allocation_attempts: u32,
    ) -> Self {
        Self {
            allocator: CodeAllocator::new(Arc::clone(&store), max_allocation_attempts),
            store,
            cache,
            generator,
            owners,
            tracker: None,
            aggregator,
            config,
        }
    }

    /// Attach a click tracker; without one, resolutions only bump the counter
    pub fn with_tracker(mut self, tracker: Arc<ClickTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn tracker(&self) -> Option<&Arc<ClickTracker>> {
        self.tracker.as_ref()
    }

    pub fn aggregator(&self) -> &AnalyticsAggregator {
        &self.aggregator
    }

    fn expiry_days(&self, requested: Option<u32>) -> Result<u32> {
        let days = requested.unwrap_or(self.config.default_expiry_days);
        if days == 0 || days > self.config.max_expiry_days {
            return Err(LinkforgeError::validation(format!(
                "Expiration must be between 1 and {} days, got {}",
                self.config.max_expiry_days, days
            )));
        }
        Ok(days)
    }

    async fn owner_id(&self, username: &str) -> Result<OwnerId> {
        self.owners
            .resolve(username)
            .await?
            .ok_or_else(|| LinkforgeError::owner_not_found(format!("Unknown owner '{}'", username)))
    }

    pub async fn create_link(&self, req: CreateLinkRequest) -> Result<LinkResponse> {
        let target = validate_url(&req.target)?.to_string();
        let days = self.expiry_days(req.expiration_days)?;
        let owner_id = self.owner_id(&req.owner).await?;

        let created_at = Utc::now();
        let expires_at = created_at + Duration::days(i64::from(days));

        // A writer on another node can take the code between the existence
        // check and the insert; the unique index reports it as a conflict.
        for attempt in 1..=self.allocator.max_attempts() {
            let code = self.allocator.allocate(&self.generator).await?;
            let new_link = NewLink {
                code,
                target: target.clone(),
                created_at,
                expires_at,
                owner_id,
            };

            match self.store.insert(new_link).await {
                Ok(link) => {
                    info!(
                        "Link created: {} -> {} (owner {}, expires {})",
                        link.code, link.target, owner_id, link.expires_at
                    );
                    self.cache.insert(link.clone()).await;
                    return Ok(link.into());
                }
                Err(LinkforgeError::CodeConflict(msg)) => {
                    debug!("Insert conflict on attempt {}: {}", attempt, msg);
                }
                Err(e) => return Err(e),
            }
        }

        Err(LinkforgeError::allocation_exhausted(format!(
            "Every allocated code conflicted on insert after {} attempts",
            self.allocator.max_attempts()
        )))
    }

    /// Cache first, then the store; store hits are cached
    async fn lookup(&self, code: &str) -> Result<Option<Link>> {
        if let CacheResult::Found(link) = self.cache.get(code).await {
            return Ok(Some(link));
        }

        let link = self.store.get(code).await?;
        if let Some(link) = &link {
            self.cache.insert(link.clone()).await;
        }
        Ok(link)
    }

    /// Resolve a code to its destination, counting the click
    pub async fn resolve(&self, code: &str, context: ClickContext) -> Result<String> {
        let link = self
            .lookup(code)
            .await?
            .ok_or_else(|| LinkforgeError::not_found(format!("Link '{}' does not exist", code)))?;

        if !link.active {
            return Err(LinkforgeError::deactivated(format!(
                "Link '{}' has been deactivated",
                code
            )));
        }
        if link.is_expired_at(Utc::now()) {
            return Err(LinkforgeError::expired(format!(
                "Link '{}' expired at {}",
                code, link.expires_at
            )));
        }

        if !self.store.increment_clicks(code).await? {
            // the record we hold is stale: the row is gone or was deactivated
            warn!("Click increment matched no active row for '{}', evicting", code);
            self.cache.remove(code).await;
            return Err(match self.store.get(code).await? {
                Some(_) => LinkforgeError::deactivated(format!(
                    "Link '{}' has been deactivated",
                    code
                )),
                None => LinkforgeError::not_found(format!("Link '{}' does not exist", code)),
            });
        }

        if let Some(tracker) = &self.tracker {
            tracker.record(ClickDetail {
                link_id: link.id,
                code: link.code.clone(),
                timestamp: Utc::now(),
                ip_address: context.ip_address,
                user_agent: context.user_agent,
                referrer: context.referrer,
            });
        }

        Ok(link.target)
    }

    /// Current record from the store, with no validity checks
    pub async fn get_link(&self, code: &str) -> Result<LinkResponse> {
        self.store
            .get(code)
            .await?
            .map(LinkResponse::from)
            .ok_or_else(|| LinkforgeError::not_found(format!("Link '{}' does not exist", code)))
    }

    /// Idempotent; the cache entry is evicted whatever the outcome
    pub async fn deactivate(&self, code: &str) -> Result<DeactivateOutcome> {
        let outcome = self.store.deactivate(code).await;
        self.cache.remove(code).await;

        match outcome? {
            DeactivateOutcome::NotFound => Err(LinkforgeError::not_found(format!(
                "Link '{}' does not exist",
                code
            ))),
            DeactivateOutcome::Deactivated => {
                info!("Link deactivated: {}", code);
                Ok(DeactivateOutcome::Deactivated)
            }
            DeactivateOutcome::AlreadyInactive => {
                debug!("Link '{}' was already inactive", code);
                Ok(DeactivateOutcome::AlreadyInactive)
            }
        }
    }

    /// Links of one owner, newest first
    pub async fn list_links(&self, owner: &str) -> Result<Vec<LinkResponse>> {
        let owner_id = self.owner_id(owner).await?;
        let links = self.store.list_by_owner(owner_id).await?;
        Ok(links.into_iter().map(LinkResponse::from).collect())
    }

    /// Click statistics. Unknown codes fail; analytics outages degrade.
    pub async fn get_stats(&self, code: &str, days: Option<u32>) -> Result<StatsResult> {
        let link = self
            .store
            .get(code)
            .await?
            .ok_or_else(|| LinkforgeError::not_found(format!("Link '{}' does not exist", code)))?;

        let metadata = LinkMetadata {
            short_code: link.code,
            original_url: link.target,
        };
        Ok(self
            .aggregator
            .get_stats(link.id, &metadata, days.unwrap_or(DEFAULT_STATS_DAYS))
            .await)
    }
}
