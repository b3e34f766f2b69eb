use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tracing::{debug, error, warn};

use coursehub_core::{AppError, AppResult};
use coursehub_domain::{RATE_LIMIT_KEY_PREFIX, RateLimitDecision, RateLimitRule};

use super::ports::RateLimitWindowStore;
use crate::key_value_ports::KeyValueStore;

/// Application service for rate limiting.
#[derive(Clone)]
pub struct RateLimitService {
    store: Option<Arc<dyn KeyValueStore>>,
    fallback: Arc<dyn RateLimitWindowStore>,
}

impl RateLimitService {
    /// Creates a service that only counts in-process.
    #[must_use]
    pub fn new(fallback: Arc<dyn RateLimitWindowStore>) -> Self {
        Self {
            store: None,
            fallback,
        }
    }

    /// Uses `store` as the shared counter store, keeping the in-process
    /// window store as fallback.
    #[must_use]
    pub fn with_shared_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Records one request for `identifier` and decides whether it may proceed.
    ///
    /// The identifier is caller-chosen, typically built with
    /// [`RateLimitRule::identifier`]. Store failures never surface here: the
    /// check degrades to the in-process fallback, and if that fails too the
    /// request is let through.
    pub async fn check_rate_limit(
        &self,
        rule: &RateLimitRule,
        identifier: &str,
    ) -> RateLimitDecision {
        if let Some(store) = &self.store {
            match check_shared(store.as_ref(), rule, identifier).await {
                Ok(decision) => return decision,
                Err(error) => {
                    warn!(
                        identifier = %identifier,
                        error = %error,
                        "shared rate limit store failed, using in-process fallback"
                    );
                }
            }
        }

        match self.fallback.record_hit(identifier, rule.window()).await {
            Ok(record) => RateLimitDecision::from_record(rule.max_requests(), &record),
            Err(error) => {
                error!(
                    identifier = %identifier,
                    error = %error,
                    "in-process rate limit fallback failed, allowing request"
                );
                let reset_at = Utc::now() + to_time_delta(rule.window());
                RateLimitDecision::from_count(rule.max_requests(), 1, reset_at)
            }
        }
    }

    /// Removes ended windows from the in-process fallback store.
    pub async fn sweep_fallback(&self) -> usize {
        match self.fallback.sweep_expired().await {
            Ok(removed) => {
                debug!(removed, "swept in-process rate limit windows");
                removed
            }
            Err(error) => {
                warn!(error = %error, "failed to sweep in-process rate limit windows");
                0
            }
        }
    }
}

async fn check_shared(
    store: &dyn KeyValueStore,
    rule: &RateLimitRule,
    identifier: &str,
) -> AppResult<RateLimitDecision> {
    let key = format!("{RATE_LIMIT_KEY_PREFIX}:{identifier}");
    let now = Utc::now();
    let window = Duration::from_secs(rule.window_seconds());

    let (count, remaining_window) = store.increment_window(&key, window).await?;
    let count = u64::try_from(count).map_err(|error| {
        AppError::Internal(format!("invalid rate limit counter for '{key}': {error}"))
    })?;

    let reset_at = now + to_time_delta(remaining_window);
    Ok(RateLimitDecision::from_count(
        rule.max_requests(),
        count,
        reset_at,
    ))
}

fn to_time_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or_else(|_| TimeDelta::zero())
}
