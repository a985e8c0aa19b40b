//! Owner identity lookup
//!
//! The identity service owns user records; this crate only needs the opaque
//! id behind a username.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use tracing::{debug, info};
use ureq::Agent;

use crate::config::{OwnerMode, OwnersConfig};
use crate::errors::{LinkforgeError, Result};
use crate::storage::OwnerId;

const USERS_PATH: &str = "/api/v1/auth/users";

#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    /// `None` when the identity service does not know the user
    async fn resolve(&self, username: &str) -> Result<Option<OwnerId>>;
}

/// In-memory directory seeded from `[owners.users]`
#[derive(Default)]
pub struct StaticOwnerDirectory {
    users: DashMap<String, OwnerId>,
}

impl StaticOwnerDirectory {
    pub fn new(users: &HashMap<String, OwnerId>) -> Self {
        let directory = Self::default();
        for (name, id) in users {
            directory.users.insert(name.clone(), *id);
        }
        directory
    }

    pub fn register(&self, username: impl Into<String>, owner_id: OwnerId) {
        self.users.insert(username.into(), owner_id);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl OwnerDirectory for StaticOwnerDirectory {
    async fn resolve(&self, username: &str) -> Result<Option<OwnerId>> {
        Ok(self.users.get(username).map(|entry| *entry.value()))
    }
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: OwnerId,
}

/// Client for the identity service
pub struct HttpOwnerDirectory {
    base_url: String,
    agent: Agent,
}

impl HttpOwnerDirectory {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(true)
            .build()
            .into();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn user_url(&self, username: &str) -> String {
        format!("{}{}/{}", self.base_url, USERS_PATH, username)
    }

    fn fetch_sync(agent: Agent, url: String) -> Result<Option<OwnerId>> {
        match agent.get(&url).call() {
            Ok(resp) => {
                let record: UserRecord = resp
                    .into_body()
                    .read_json()
                    .map_err(|e| LinkforgeError::upstream(format!("Bad user record: {}", e)))?;
                Ok(Some(record.id))
            }
            Err(ureq::Error::StatusCode(404)) => Ok(None),
            Err(e) => Err(LinkforgeError::upstream(format!(
                "Owner lookup failed: {}",
                e
            ))),
        }
    }
}

#[async_trait]
impl OwnerDirectory for HttpOwnerDirectory {
    async fn resolve(&self, username: &str) -> Result<Option<OwnerId>> {
        let agent = self.agent.clone();
        let url = self.user_url(username);
        debug!("Resolving owner '{}' via {}", username, url);

        tokio::task::spawn_blocking(move || Self::fetch_sync(agent, url))
            .await
            .map_err(|e| LinkforgeError::upstream(format!("Owner lookup task failed: {}", e)))?
    }
}

/// Build the directory selected by `[owners] mode`
pub fn create_owner_directory(
    config: &OwnersConfig,
    timeout: Duration,
) -> Arc<dyn OwnerDirectory> {
    info!("Using {} owner directory", config.mode);
    match config.mode {
        OwnerMode::Static => Arc::new(StaticOwnerDirectory::new(&config.users)),
        OwnerMode::Http => Arc::new(HttpOwnerDirectory::new(
            &config.auth_base_url,
            timeout,
        )),
    }
}
