use std::time::Duration;

use async_trait::async_trait;
use coursehub_core::AppResult;

/// Remaining lifetime of a stored key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
    /// The key does not exist.
    Missing,
    /// The key exists without an expiry.
    Persistent,
    /// The key expires after the given duration.
    ExpiresIn(Duration),
}

impl KeyTtl {
    /// Interprets a Redis-style `TTL` reply (`-2` missing, `-1` no expiry).
    #[must_use]
    pub fn from_seconds(seconds: i64) -> Self {
        match seconds {
            -2 => Self::Missing,
            value if value < 0 => Self::Persistent,
            value => Self::ExpiresIn(Duration::from_secs(value.unsigned_abs())),
        }
    }
}

/// Port for the shared key-value store backing rate limits and caching.
///
/// Keys are plain strings chosen by callers. Implementations report every
/// failure as an error and leave degradation decisions to the services.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Writes a value, replacing any previous value and expiry.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()>;

    /// Deletes keys and returns how many existed.
    async fn delete(&self, keys: &[String]) -> AppResult<u64>;

    /// Atomically increments an integer counter, creating it at 1.
    async fn increment(&self, key: &str) -> AppResult<i64>;

    /// Increments a window counter and returns it with the window's remaining
    /// lifetime. The expiry is only set when the counter has none, so the
    /// first hit opens the window and later hits never extend it.
    ///
    /// The provided implementation takes up to three calls and repairs a
    /// counter left without expiry by an interrupted caller. Stores that can
    /// run this as one operation should override it.
    async fn increment_window(&self, key: &str, window: Duration) -> AppResult<(i64, Duration)> {
        let count = self.increment(key).await?;
        let remaining = match self.ttl(key).await? {
            KeyTtl::ExpiresIn(remaining) => remaining,
            KeyTtl::Persistent | KeyTtl::Missing => {
                self.expire(key, window).await?;
                window
            }
        };

        Ok((count, remaining))
    }

    /// Sets an expiry on an existing key. Returns `false` when the key is missing.
    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool>;

    /// Returns the remaining lifetime of a key.
    async fn ttl(&self, key: &str) -> AppResult<KeyTtl>;

    /// Lists keys matching a glob pattern (`*`, `?`, `[...]`, `\` escapes).
    async fn keys(&self, pattern: &str) -> AppResult<Vec<String>>;

    /// Returns whether a key exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Verifies the store is reachable.
    async fn ping(&self) -> AppResult<()>;
}
