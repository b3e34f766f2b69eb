use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;
use tokio::time::Instant;

use coursehub_application::RateLimitWindowStore;
use coursehub_core::AppResult;
use coursehub_domain::RateLimitRecord;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u64,
    expires_at: Instant,
    reset_at: DateTime<Utc>,
}

/// In-process fixed-window counters used when the shared store is unavailable.
#[derive(Default)]
pub struct InMemoryRateLimitWindowStore {
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryRateLimitWindowStore {
    /// Creates an empty window store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitWindowStore for InMemoryRateLimitWindowStore {
    async fn record_hit(&self, key: &str, window: Duration) -> AppResult<RateLimitRecord> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        let current = match windows.get_mut(key) {
            Some(current) if current.expires_at > now => {
                current.count = current.count.saturating_add(1);
                *current
            }
            _ => {
                let fresh = Window {
                    count: 1,
                    expires_at: now.checked_add(window).unwrap_or(now),
                    reset_at: Utc::now()
                        + TimeDelta::from_std(window).unwrap_or_else(|_| TimeDelta::zero()),
                };
                windows.insert(key.to_owned(), fresh);
                fresh
            }
        };

        Ok(RateLimitRecord {
            key: key.to_owned(),
            count: current.count,
            window_reset_at: current.reset_at,
        })
    }

    async fn sweep_expired(&self) -> AppResult<usize> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, window| window.expires_at > now);
        Ok(before - windows.len())
    }
}
