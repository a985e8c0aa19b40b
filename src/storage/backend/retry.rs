//! Replaying idempotent statements
//!
//! Driver errors are first sorted into [`LinkforgeError`]s by [`classify`].
//! Only statements that are safe to run twice go through [`replay`]: the
//! existence check, the click increment and deactivation. Inserts run
//! exactly once; a replayed link insert whose first attempt landed would
//! report a conflict on its own code.

use std::future::Future;
use std::ops::Deref;
use std::time::Duration;

use rand::RngExt;
use sea_orm::error::RuntimeErr;
use sea_orm::{DbErr, SqlErr};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::connection::Backend;
use crate::config::DatabaseConfig;
use crate::errors::{LinkforgeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Replays after the first attempt
    pub max_replays: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            max_replays: config.retry_count,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        }
    }

    /// Delay before replay `n` (1-based): doubling from `base_delay`, capped
    /// at `max_delay`, plus up to a quarter of jitter.
    pub fn delay_for(&self, n: u32) -> Duration {
        let doubled = self
            .base_delay
            .saturating_mul(1u32.checked_shl(n.saturating_sub(1)).unwrap_or(u32::MAX));
        let capped = doubled.min(self.max_delay);
        let quarter = capped.as_millis() as u64 / 4;
        capped + Duration::from_millis(rand::rng().random_range(0..=quarter))
    }
}

/// Map a driver error onto the crate's taxonomy.
///
/// Lock contention is recognised by the backend's own error codes.
pub fn classify(backend: Backend, context: &str, err: DbErr) -> LinkforgeError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return LinkforgeError::code_conflict(format!("{}: {}", context, detail));
    }

    match &err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
            LinkforgeError::database_connection(format!("{}: {}", context, err))
        }
        DbErr::Exec(runtime) | DbErr::Query(runtime) if is_lock_contention(backend, runtime) => {
            LinkforgeError::database_busy(format!("{}: {}", context, err))
        }
        _ => LinkforgeError::database_operation(format!("{}: {}", context, err)),
    }
}

fn is_lock_contention(backend: Backend, runtime: &RuntimeErr) -> bool {
    let RuntimeErr::SqlxError(sqlx_err) = runtime else {
        return false;
    };
    let Some(code) = sqlx_err.deref().as_database_error().and_then(|e| e.code()) else {
        return false;
    };

    match backend {
        // primary result code lives in the low byte of the extended code
        Backend::Sqlite => code
            .parse::<i32>()
            .is_ok_and(|extended| matches!(extended & 0xff, 5 | 6)),
        // deadlock, lock wait timeout
        Backend::MySql => matches!(code.as_ref(), "1213" | "1205"),
        // serialization failure, deadlock detected
        Backend::Postgres => matches!(code.as_ref(), "40001" | "40P01"),
    }
}

/// Run `statement`, replaying it while it fails transiently.
pub async fn replay<T, F, Fut>(
    label: &str,
    backend: Backend,
    policy: RetryPolicy,
    mut statement: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, DbErr>>,
{
    let mut replays = 0;
    loop {
        let err = match statement().await {
            Ok(value) => {
                if replays > 0 {
                    debug!("'{}' succeeded after {} replays", label, replays);
                }
                return Ok(value);
            }
            Err(e) => classify(backend, label, e),
        };

        if !err.is_transient() || replays >= policy.max_replays {
            return Err(err);
        }

        replays += 1;
        let delay = policy.delay_for(replays);
        warn!(
            "'{}' hit a transient failure ({}), replay {}/{} in {:?}",
            label,
            err.message(),
            replays,
            policy.max_replays,
            delay
        );
        sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::error::ConnAcquireErr;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_replays: u32) -> RetryPolicy {
        RetryPolicy {
            max_replays,
            base_delay: Duration::from_millis(2),
            max_delay: Duration::from_millis(8),
        }
    }

    #[test]
    fn test_classify_pool_exhaustion_is_transient() {
        let err = classify(
            Backend::Sqlite,
            "increment_clicks(4C92)",
            DbErr::ConnectionAcquire(ConnAcquireErr::Timeout),
        );
        assert!(matches!(err, LinkforgeError::DatabaseConnection(_)));
        assert!(err.message().starts_with("increment_clicks(4C92)"));
    }

    #[test]
    fn test_classify_leaves_logic_errors_permanent() {
        for err in [
            DbErr::RecordNotFound("links".to_string()),
            DbErr::Custom("bad column".to_string()),
            // no driver code, so not mistaken for contention
            DbErr::Exec(RuntimeErr::Internal("database is locked".to_string())),
        ] {
            let classified = classify(Backend::Sqlite, "exists(abc)", err);
            assert!(matches!(classified, LinkforgeError::DatabaseOperation(_)));
            assert!(!classified.is_transient());
        }
    }

    #[test]
    fn test_delay_doubles_then_caps() {
        let policy = RetryPolicy {
            max_replays: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
        };
        let ms = |n| policy.delay_for(n).as_millis();

        assert!((100..=125).contains(&ms(1)));
        assert!((200..=250).contains(&ms(2)));
        assert!((300..=375).contains(&ms(3)));
        assert!((300..=375).contains(&ms(40)));
    }

    #[tokio::test]
    async fn test_replay_recovers_from_dropped_connections() {
        let attempts = AtomicU32::new(0);

        let rows = replay("deactivate(4C92)", Backend::Sqlite, policy(3), || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout))
                } else {
                    Ok(1u64)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(rows, 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_replay_gives_up_with_the_transient_error() {
        let attempts = AtomicU32::new(0);

        let result: Result<u64> = replay("exists(4C92)", Backend::Postgres, policy(2), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)) }
        })
        .await;

        assert!(matches!(result, Err(LinkforgeError::DatabaseConnection(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_replay_does_not_repeat_permanent_failures() {
        let attempts = AtomicU32::new(0);

        let result: Result<u64> = replay("increment_clicks(zz)", Backend::MySql, policy(5), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(DbErr::Custom("no such table: links".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(LinkforgeError::DatabaseOperation(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
