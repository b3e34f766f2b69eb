use std::sync::Arc;

use coursehub_application::KeyValueStore;
use coursehub_infrastructure::{InMemoryKeyValueStore, RedisKeyValueStore};
use tracing::{info, warn};

use crate::api_config::{ApiConfig, KeyValueStoreConfig};

/// The configured key-value store, plus the Redis handle needed on shutdown.
#[derive(Default)]
pub struct KeyValueBackend {
    pub store: Option<Arc<dyn KeyValueStore>>,
    pub redis: Option<Arc<RedisKeyValueStore>>,
}

/// Builds the configured store. A Redis URL the client cannot parse (such as
/// an Upstash REST endpoint) leaves the service running without a store.
pub fn build_key_value_backend(config: &ApiConfig) -> KeyValueBackend {
    match &config.key_value_store {
        KeyValueStoreConfig::Disabled => {
            warn!("no key-value store configured, rate limits are per-process and caching is off");
            KeyValueBackend::default()
        }
        KeyValueStoreConfig::InMemory => {
            info!("using in-process key-value store");
            KeyValueBackend {
                store: Some(Arc::new(InMemoryKeyValueStore::new())),
                redis: None,
            }
        }
        KeyValueStoreConfig::Redis { url } => {
            match RedisKeyValueStore::open(url, config.redis_connect_timeout) {
                Ok(redis) => {
                    info!("using redis key-value store");
                    let redis = Arc::new(redis.with_retry_cooldown(config.redis_retry_cooldown));
                    KeyValueBackend {
                        store: Some(redis.clone()),
                        redis: Some(redis),
                    }
                }
                Err(error) => {
                    warn!(error = %error, "redis client rejected REDIS_URL, running without key-value store");
                    KeyValueBackend::default()
                }
            }
        }
    }
}
