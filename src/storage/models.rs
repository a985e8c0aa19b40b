use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque reference to a user record owned by the identity service
pub type OwnerId = i64;
/// Storage identifier of a link; click events reference links by it
pub type LinkId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub code: String,
    pub target: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub active: bool,
    #[serde(default)]
    pub click_count: u64,
    pub owner_id: OwnerId,
}

impl Link {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// A link that has not been persisted yet
#[derive(Debug, Clone)]
pub struct NewLink {
    pub code: String,
    pub target: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub owner_id: OwnerId,
}

/// Result of a conditional deactivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeactivateOutcome {
    /// The flag flipped from true to false
    Deactivated,
    AlreadyInactive,
    NotFound,
}
