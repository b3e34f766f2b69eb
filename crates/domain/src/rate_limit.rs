//! Rate limiting rules, window records and decisions.

use std::time::Duration;

use chrono::{DateTime, Utc};
use coursehub_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Namespace for rate limit counters kept in the shared key-value store.
pub const RATE_LIMIT_KEY_PREFIX: &str = "ratelimit";

/// Configuration for a rate limit rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRule {
    category: NonEmptyString,
    max_requests: u32,
    window: Duration,
}

impl RateLimitRule {
    /// Creates a validated rate limit rule.
    ///
    /// `category` names the protected surface (e.g. `"courses"`) and becomes
    /// the first segment of every identifier built by [`Self::identifier`].
    pub fn new(
        category: impl Into<String>,
        max_requests: u32,
        window: Duration,
    ) -> AppResult<Self> {
        let category = NonEmptyString::new(category)?;

        if max_requests == 0 {
            return Err(AppError::Validation(
                "max_requests must be greater than zero".to_owned(),
            ));
        }

        if window.as_millis() == 0 {
            return Err(AppError::Validation(
                "rate limit window must be at least one millisecond".to_owned(),
            ));
        }

        Ok(Self {
            category,
            max_requests,
            window,
        })
    }

    /// Creates a rule with a one minute window.
    pub fn per_minute(category: impl Into<String>, max_requests: u32) -> AppResult<Self> {
        Self::new(category, max_requests, Duration::from_secs(60))
    }

    /// Returns the rule category.
    #[must_use]
    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    /// Returns the maximum number of requests allowed in one window.
    #[must_use]
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Returns the window length.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns the window length rounded up to whole seconds, never below one.
    #[must_use]
    pub fn window_seconds(&self) -> u64 {
        let millis = self.window.as_millis();
        let seconds = millis.div_ceil(1000).max(1);
        u64::try_from(seconds).unwrap_or(u64::MAX)
    }

    /// Builds the caller identifier `"{category}:{subject}"`.
    #[must_use]
    pub fn identifier(&self, subject: &str) -> String {
        format!("{}:{subject}", self.category.as_str())
    }
}

/// One counting window for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRecord {
    /// Identifier the window belongs to.
    pub key: String,
    /// Requests seen in the current window, including the latest one.
    pub count: u64,
    /// When the current window ends.
    pub window_reset_at: DateTime<Utc>,
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Maximum number of requests in the window.
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// When the current window ends.
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Derives a decision from the post-increment window count.
    #[must_use]
    pub fn from_count(limit: u32, count: u64, reset_at: DateTime<Utc>) -> Self {
        let allowed = count <= u64::from(limit);
        let remaining = if allowed {
            u32::try_from(u64::from(limit) - count).unwrap_or(0)
        } else {
            0
        };

        Self {
            allowed,
            limit,
            remaining,
            reset_at,
        }
    }

    /// Derives a decision from a window record.
    #[must_use]
    pub fn from_record(limit: u32, record: &RateLimitRecord) -> Self {
        Self::from_count(limit, record.count, record.window_reset_at)
    }

    /// Seconds a denied caller should wait, never below one.
    #[must_use]
    pub fn retry_after_seconds(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.reset_at - now).num_milliseconds().max(0);
        let seconds = u64::try_from(millis).unwrap_or(0).div_ceil(1000);
        seconds.max(1)
    }

    /// Window end as Unix epoch milliseconds.
    #[must_use]
    pub fn reset_at_millis(&self) -> i64 {
        self.reset_at.timestamp_millis()
    }
}
