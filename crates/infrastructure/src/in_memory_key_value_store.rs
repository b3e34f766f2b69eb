use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use coursehub_application::{KeyTtl, KeyValueStore};
use coursehub_core::{AppError, AppResult};

mod pattern;

#[cfg(test)]
mod tests;

use pattern::glob_matches;

#[derive(Debug, Clone)]
struct StoredEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// Process-local key-value store for single-instance deployments and tests.
///
/// Expired entries are invisible to every operation and removed lazily.
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, StoredEntry>>,
}

impl InMemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn expiry_from(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or(now)
}

fn remove_if_expired(entries: &mut HashMap<String, StoredEntry>, key: &str, now: Instant) {
    if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
        entries.remove(key);
    }
}

/// Adds one to the counter at `key`, creating it without expiry.
fn increment_entry<'a>(
    entries: &'a mut HashMap<String, StoredEntry>,
    key: &str,
    now: Instant,
) -> AppResult<(i64, &'a mut StoredEntry)> {
    remove_if_expired(entries, key, now);

    let entry = entries.entry(key.to_owned()).or_insert_with(|| StoredEntry {
        value: "0".to_owned(),
        expires_at: None,
    });

    let current = entry
        .value
        .parse::<i64>()
        .map_err(|_| AppError::Validation(format!("value at '{key}' is not an integer")))?;
    let next = current.checked_add(1).ok_or_else(|| {
        AppError::Validation(format!("increment would overflow value at '{key}'"))
    })?;

    entry.value = next.to_string();
    Ok((next, entry))
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(Instant::now()) => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        remove_if_expired(&mut *self.entries.write().await, key, Instant::now());
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        if ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(AppError::Validation(
                "cache ttl must be greater than zero".to_owned(),
            ));
        }

        let now = Instant::now();
        self.entries.write().await.insert(
            key.to_owned(),
            StoredEntry {
                value: value.to_owned(),
                expires_at: ttl.map(|ttl| expiry_from(now, ttl)),
            },
        );

        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> AppResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let removed = keys
            .iter()
            .filter_map(|key| entries.remove(key.as_str()))
            .filter(|entry| entry.is_live(now))
            .count();

        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    async fn increment(&self, key: &str) -> AppResult<i64> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        increment_entry(&mut entries, key, now).map(|(count, _)| count)
    }

    async fn increment_window(&self, key: &str, window: Duration) -> AppResult<(i64, Duration)> {
        if window.is_zero() {
            return Err(AppError::Validation(
                "rate limit window must be greater than zero".to_owned(),
            ));
        }

        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let (count, entry) = increment_entry(&mut entries, key, now)?;
        let expires_at = *entry
            .expires_at
            .get_or_insert_with(|| expiry_from(now, window));

        Ok((count, expires_at.saturating_duration_since(now)))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        remove_if_expired(&mut entries, key, now);

        if ttl.is_zero() {
            return Ok(entries.remove(key).is_some());
        }

        Ok(match entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(expiry_from(now, ttl));
                true
            }
            None => false,
        })
    }

    async fn ttl(&self, key: &str) -> AppResult<KeyTtl> {
        let now = Instant::now();
        let entries = self.entries.read().await;

        Ok(match entries.get(key) {
            Some(entry) if entry.is_live(now) => match entry.expires_at {
                Some(expires_at) => KeyTtl::ExpiresIn(expires_at.saturating_duration_since(now)),
                None => KeyTtl::Persistent,
            },
            _ => KeyTtl::Missing,
        })
    }

    async fn keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_live(now));

        let mut keys: Vec<String> = entries
            .keys()
            .filter(|key| glob_matches(pattern, key))
            .cloned()
            .collect();
        keys.sort();

        Ok(keys)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .is_some_and(|entry| entry.is_live(now)))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
