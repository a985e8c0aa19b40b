use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info};

use super::startup::StartupContext;

/// Upper bound for draining the click queue
const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// Drain and stop the click tracker, if any
pub async fn shutdown(context: &StartupContext) {
    let Some(tracker) = context.tracker.clone() else {
        return;
    };

    let drained = timeout(
        Duration::from_secs(SHUTDOWN_TIMEOUT_SECS),
        tokio::task::spawn_blocking(move || tracker.shutdown()),
    )
    .await;

    match drained {
        Ok(Ok(())) => info!("Click tracker drained"),
        Ok(Err(e)) => error!("Click tracker shutdown task failed: {}", e),
        Err(_) => error!(
            "Click tracker did not drain within {} seconds",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}
