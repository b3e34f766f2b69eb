use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use coursehub_core::{AppError, AppResult};
use coursehub_domain::RateLimitRecord;

use crate::{KeyTtl, KeyValueStore, RateLimitWindowStore};

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    ttl: Option<Duration>,
}

/// Key-value store double without real expiry: TTLs are recorded, never applied.
#[derive(Default)]
pub(crate) struct FakeKeyValueStore {
    entries: Mutex<HashMap<String, StoredValue>>,
    pub(crate) expire_calls: AtomicUsize,
    pub(crate) set_calls: AtomicUsize,
}

impl FakeKeyValueStore {
    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<String, StoredValue>>> {
        self.entries
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock test store: {error}")))
    }

    pub(crate) fn insert(&self, key: &str, value: &str, ttl: Option<Duration>) {
        if let Ok(mut entries) = self.lock() {
            entries.insert(
                key.to_owned(),
                StoredValue {
                    value: value.to_owned(),
                    ttl,
                },
            );
        }
    }

    pub(crate) fn raw(&self, key: &str) -> Option<String> {
        self.lock()
            .ok()
            .and_then(|entries| entries.get(key).map(|entry| entry.value.clone()))
    }

    pub(crate) fn recorded_ttl(&self, key: &str) -> Option<Duration> {
        self.lock()
            .ok()
            .and_then(|entries| entries.get(key).and_then(|entry| entry.ttl))
    }
}

#[async_trait]
impl KeyValueStore for FakeKeyValueStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.lock()?.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.lock()?.insert(
            key.to_owned(),
            StoredValue {
                value: value.to_owned(),
                ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> AppResult<u64> {
        let mut entries = self.lock()?;
        let removed = keys
            .iter()
            .filter(|key| entries.remove(key.as_str()).is_some())
            .count();
        Ok(removed as u64)
    }

    async fn increment(&self, key: &str) -> AppResult<i64> {
        let mut entries = self.lock()?;
        let entry = entries.entry(key.to_owned()).or_insert(StoredValue {
            value: "0".to_owned(),
            ttl: None,
        });
        let next = entry
            .value
            .parse::<i64>()
            .map_err(|error| AppError::Validation(format!("value is not an integer: {error}")))?
            + 1;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        self.expire_calls.fetch_add(1, Ordering::SeqCst);
        Ok(match self.lock()?.get_mut(key) {
            Some(entry) => {
                entry.ttl = Some(ttl);
                true
            }
            None => false,
        })
    }

    async fn ttl(&self, key: &str) -> AppResult<KeyTtl> {
        Ok(match self.lock()?.get(key) {
            None => KeyTtl::Missing,
            Some(StoredValue { ttl: None, .. }) => KeyTtl::Persistent,
            Some(StoredValue { ttl: Some(ttl), .. }) => KeyTtl::ExpiresIn(*ttl),
        })
    }

    async fn keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        let prefix = pattern.trim_end_matches('*');
        let mut keys: Vec<String> = self
            .lock()?
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.lock()?.contains_key(key))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Key-value store double that fails every call.
#[derive(Default)]
pub(crate) struct FailingKeyValueStore {
    pub(crate) calls: AtomicUsize,
}

impl FailingKeyValueStore {
    fn fail<T>(&self) -> AppResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::Unavailable("connection refused".to_owned()))
    }
}

#[async_trait]
impl KeyValueStore for FailingKeyValueStore {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        self.fail()
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> AppResult<()> {
        self.fail()
    }

    async fn delete(&self, _keys: &[String]) -> AppResult<u64> {
        self.fail()
    }

    async fn increment(&self, _key: &str) -> AppResult<i64> {
        self.fail()
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> AppResult<bool> {
        self.fail()
    }

    async fn ttl(&self, _key: &str) -> AppResult<KeyTtl> {
        self.fail()
    }

    async fn keys(&self, _pattern: &str) -> AppResult<Vec<String>> {
        self.fail()
    }

    async fn exists(&self, _key: &str) -> AppResult<bool> {
        self.fail()
    }

    async fn ping(&self) -> AppResult<()> {
        self.fail()
    }
}

/// Window store double that never ends a window.
#[derive(Default)]
pub(crate) struct FakeWindowStore {
    counts: Mutex<HashMap<String, u64>>,
    fail: bool,
}

impl FakeWindowStore {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl RateLimitWindowStore for FakeWindowStore {
    async fn record_hit(&self, key: &str, window: Duration) -> AppResult<RateLimitRecord> {
        if self.fail {
            return Err(AppError::Internal("window store poisoned".to_owned()));
        }

        let mut counts = self
            .counts
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock counts: {error}")))?;
        let count = counts.entry(key.to_owned()).or_insert(0);
        *count += 1;

        Ok(RateLimitRecord {
            key: key.to_owned(),
            count: *count,
            window_reset_at: Utc::now()
                + chrono::TimeDelta::from_std(window).unwrap_or_else(|_| chrono::TimeDelta::zero()),
        })
    }

    async fn sweep_expired(&self) -> AppResult<usize> {
        if self.fail {
            return Err(AppError::Internal("window store poisoned".to_owned()));
        }

        let mut counts = self
            .counts
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock counts: {error}")))?;
        let removed = counts.len();
        counts.clear();
        Ok(removed)
    }
}
