//! Periodic removal of expired blacklist entries
//!
//! A blacklisted token whose `exp` has passed already fails signature
//! validation, so its entry can be dropped without re-admitting it.

use crate::core::error::Result;
use crate::db::repository::TokenBlacklist;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Remove every entry that expired at or before now
pub async fn prune_once(blacklist: &dyn TokenBlacklist) -> Result<usize> {
    let removed = blacklist.prune_expired(chrono::Utc::now().timestamp()).await?;
    if removed > 0 {
        tracing::info!(removed, "Pruned expired blacklist entries");
    }
    Ok(removed)
}

/// Spawn the pruning loop; the first pass runs immediately
pub fn spawn(blacklist: Arc<dyn TokenBlacklist>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(e) = prune_once(blacklist.as_ref()).await {
                tracing::error!("Failed to prune token blacklist: {}", e);
            }
        }
    })
}
