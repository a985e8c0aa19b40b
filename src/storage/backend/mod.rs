//! SeaORM storage backend
//!
//! Link registry, click event log and local analytics on top of SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod analytics;
mod click_sink;
mod connection;
mod converters;
mod mutations;
mod query;
mod retry;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{LinkforgeError, Result};
use crate::storage::{DeactivateOutcome, Link, LinkStore, NewLink, OwnerId};

pub use connection::Backend;
pub use converters::{model_to_link, new_link_to_active_model};
use retry::RetryPolicy;

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend: Backend,
    retry_policy: RetryPolicy,
}

impl SeaOrmStorage {
    /// Connect using the `[database]` section and run pending migrations
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if config.database_url.is_empty() {
            return Err(LinkforgeError::database_config("database_url is empty"));
        }

        let backend = Backend::from_url(&config.database_url)?;
        let db = connection::open(config, backend).await?;

        info!("{} storage initialized", backend);
        Ok(SeaOrmStorage {
            db,
            backend,
            retry_policy: RetryPolicy::from_config(config),
        })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }
}

#[async_trait]
impl LinkStore for SeaOrmStorage {
    async fn exists(&self, code: &str) -> Result<bool> {
        self.code_exists(code).await
    }

    async fn insert(&self, link: NewLink) -> Result<Link> {
        self.insert_link(link).await
    }

    async fn get(&self, code: &str) -> Result<Option<Link>> {
        self.find_by_code(code).await
    }

    async fn increment_clicks(&self, code: &str) -> Result<bool> {
        self.add_click(code).await
    }

    async fn deactivate(&self, code: &str) -> Result<DeactivateOutcome> {
        self.deactivate_code(code).await
    }

    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Link>> {
        self.find_by_owner(owner_id).await
    }
}
