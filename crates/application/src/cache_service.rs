//! Read-through cache facade over the shared key-value store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use coursehub_core::AppResult;
use coursehub_domain::CacheEntry;

use crate::key_value_ports::KeyValueStore;


/// Memoizes expensive computations in the shared key-value store.
///
/// The store is strictly an optimization: read failures and undecodable
/// entries count as misses, write failures are logged, and without a store
/// every call computes directly.
#[derive(Clone, Default)]
pub struct CacheService {
    store: Option<Arc<dyn KeyValueStore>>,
}

impl CacheService {
    /// Creates a cache backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Creates a cache that always computes.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Returns whether a backing store is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Returns the cached value for `key`, or computes it with `fetcher` and
    /// stores the result for `ttl`.
    ///
    /// Only errors from `fetcher` are returned. A zero `ttl` computes without
    /// writing.
    pub async fn get_cached<T, F, Fut>(&self, key: &str, ttl: Duration, fetcher: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let Some(store) = &self.store else {
            return fetcher().await;
        };

        match store.get(key).await {
            Ok(Some(raw)) => match CacheEntry::decode::<T>(key, &raw) {
                Ok(value) => {
                    debug!(key = %key, "cache hit");
                    return Ok(value);
                }
                Err(error) => {
                    warn!(key = %key, error = %error, "discarding undecodable cache entry");
                }
            },
            Ok(None) => debug!(key = %key, "cache miss"),
            Err(error) => {
                warn!(key = %key, error = %error, "cache read failed, computing directly");
            }
        }

        let value = fetcher().await?;

        if ttl.is_zero() {
            return Ok(value);
        }

        match CacheEntry::encode(key, &value, ttl) {
            Ok(entry) => {
                if let Err(error) = store
                    .set(&entry.key, &entry.serialized_value, Some(entry.ttl))
                    .await
                {
                    warn!(key = %key, error = %error, "cache write failed");
                }
            }
            Err(error) => warn!(key = %key, error = %error, "failed to encode cache entry"),
        }

        Ok(value)
    }

    /// Deletes every key matching the glob `pattern` and returns how many
    /// were removed. Failures are logged and reported as zero.
    pub async fn invalidate(&self, pattern: &str) -> u64 {
        let Some(store) = &self.store else {
            return 0;
        };

        let keys = match store.keys(pattern).await {
            Ok(keys) => keys,
            Err(error) => {
                warn!(pattern = %pattern, error = %error, "failed to list cache keys");
                return 0;
            }
        };

        if keys.is_empty() {
            return 0;
        }

        match store.delete(&keys).await {
            Ok(removed) => {
                debug!(pattern = %pattern, removed, "invalidated cache entries");
                removed
            }
            Err(error) => {
                warn!(pattern = %pattern, error = %error, "failed to delete cache keys");
                0
            }
        }
    }
}
