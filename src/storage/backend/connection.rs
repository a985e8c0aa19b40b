//! Opening the link database

use std::str::FromStr;
use std::time::Duration;

use sea_orm::sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, SqlxSqliteConnector};
use strum::{Display, IntoStaticStr};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::errors::{LinkforgeError, Result};
use migration::{Migrator, MigratorTrait};

/// SQLite waits this long on a locked file before reporting busy
const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Backend {
    Sqlite,
    MySql,
    Postgres,
}

impl Backend {
    /// Infer the backend from a database URL
    pub fn from_url(database_url: &str) -> Result<Self> {
        if database_url.starts_with("sqlite:")
            || database_url.ends_with(".db")
            || database_url.ends_with(".sqlite")
        {
            Ok(Backend::Sqlite)
        } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
            Ok(Backend::MySql)
        } else if database_url.starts_with("postgres://")
            || database_url.starts_with("postgresql://")
        {
            Ok(Backend::Postgres)
        } else {
            Err(LinkforgeError::database_config(format!(
                "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
                database_url
            )))
        }
    }
}

/// Open a pool for `config.database_url` and bring the schema up to date
pub async fn open(config: &DatabaseConfig, backend: Backend) -> Result<DatabaseConnection> {
    let url = config.database_url.as_str();

    let db = match backend {
        Backend::Sqlite => open_sqlite(url, config.pool_size).await?,
        Backend::MySql | Backend::Postgres => {
            let mut opt = ConnectOptions::new(url.to_owned());
            opt.max_connections(config.pool_size)
                .min_connections(config.pool_size.min(2))
                .connect_timeout(Duration::from_secs(8))
                .acquire_timeout(Duration::from_secs(8))
                .sqlx_logging(false);

            Database::connect(opt).await.map_err(|e| {
                LinkforgeError::database_connection(format!(
                    "Failed to connect to {}: {}",
                    backend, e
                ))
            })?
        }
    };
    debug!("Opened {} pool of {} connections", backend, config.pool_size);

    Migrator::up(&db, None)
        .await
        .map_err(|e| LinkforgeError::database_operation(format!("Migration failed: {}", e)))?;
    info!("Link schema is up to date on {}", backend);

    Ok(db)
}

/// WAL lets click increments proceed while readers resolve codes
async fn open_sqlite(url: &str, pool_size: u32) -> Result<DatabaseConnection> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(|e| {
            LinkforgeError::database_config(format!("Invalid SQLite URL '{}': {}", url, e))
        })?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(SQLITE_BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(pool_size.max(1))
        .connect_with(options)
        .await
        .map_err(|e| LinkforgeError::database_connection(format!("Failed to open SQLite: {}", e)))?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}
