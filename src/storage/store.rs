use async_trait::async_trait;

use super::models::{DeactivateOutcome, Link, NewLink, OwnerId};
use crate::errors::Result;

/// Durable code registry, the system of record for links
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn exists(&self, code: &str) -> Result<bool>;

    /// Insert-if-absent. A taken code fails with `CodeConflict`.
    async fn insert(&self, link: NewLink) -> Result<Link>;

    async fn get(&self, code: &str) -> Result<Option<Link>>;

    /// Atomically add one to the click counter of an active link. Returns
    /// false when no active row matched.
    async fn increment_clicks(&self, code: &str) -> Result<bool>;

    /// Flip the active flag true -> false; never the other way.
    async fn deactivate(&self, code: &str) -> Result<DeactivateOutcome>;

    /// Links of one owner, newest first
    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Link>>;
}
