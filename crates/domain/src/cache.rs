//! Cached values as stored in the key-value store: JSON text plus a lifetime.

use std::time::Duration;

use coursehub_core::{AppError, AppResult};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A value serialized for the key-value store together with its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Store key chosen by the caller.
    pub key: String,
    /// JSON encoding of the cached value.
    pub serialized_value: String,
    /// Lifetime after which the store drops the entry.
    pub ttl: Duration,
}

impl CacheEntry {
    /// Serializes `value` as JSON for `key`.
    pub fn encode<T: Serialize>(key: impl Into<String>, value: &T, ttl: Duration) -> AppResult<Self> {
        let key = key.into();
        let serialized_value = serde_json::to_string(value).map_err(|error| {
            AppError::Internal(format!("failed to serialize cache entry '{key}': {error}"))
        })?;

        Ok(Self {
            key,
            serialized_value,
            ttl,
        })
    }

    /// Deserializes a raw stored value.
    pub fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> AppResult<T> {
        serde_json::from_str(raw).map_err(|error| {
            AppError::Internal(format!("failed to deserialize cache entry '{key}': {error}"))
        })
    }
}
