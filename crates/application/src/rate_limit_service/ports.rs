use std::time::Duration;

use async_trait::async_trait;
use coursehub_core::AppResult;
use coursehub_domain::RateLimitRecord;

/// In-process window store used when the shared store is unavailable.
#[async_trait]
pub trait RateLimitWindowStore: Send + Sync {
    /// Records one request for `key`.
    ///
    /// Starts a new window of length `window` when none is active, otherwise
    /// increments the active window. Returns the updated record.
    async fn record_hit(&self, key: &str, window: Duration) -> AppResult<RateLimitRecord>;

    /// Drops windows that have ended. Returns how many were removed.
    async fn sweep_expired(&self) -> AppResult<usize>;
}
