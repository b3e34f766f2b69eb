//! Redis-backed key-value store with lazy connection management.

use std::time::Duration;

use async_trait::async_trait;
use redis::Script;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use coursehub_application::{KeyTtl, KeyValueStore};
use coursehub_core::{AppError, AppResult};


const SCAN_BATCH_SIZE: u32 = 100;

/// Default pause after a failed connect before the next attempt.
const DEFAULT_RETRY_COOLDOWN: Duration = Duration::from_secs(1);

const INCREMENT_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local window = tonumber(ARGV[1])

local count = redis.call('INCR', key)
local ttl = redis.call('TTL', key)

if ttl < 0 then
  redis.call('EXPIRE', key, window)
  ttl = window
end

return {count, ttl}
"#;

#[derive(Default)]
struct ConnectionSlot {
    connection: Option<ConnectionManager>,
    retry_after: Option<Instant>,
}

/// Redis implementation of the key-value store port.
///
/// The connection is created on first use and shared afterwards. Concurrent
/// first callers wait on the same attempt instead of opening their own. No
/// caller waits longer than the connect timeout in total, and after a failed
/// attempt calls fail fast until the retry cool-down has passed.
pub struct RedisKeyValueStore {
    client: redis::Client,
    connect_timeout: Duration,
    retry_cooldown: Duration,
    slot: Mutex<ConnectionSlot>,
}

impl RedisKeyValueStore {
    /// Creates a store with a configured Redis client.
    #[must_use]
    pub fn new(client: redis::Client, connect_timeout: Duration) -> Self {
        Self {
            client,
            connect_timeout,
            retry_cooldown: DEFAULT_RETRY_COOLDOWN,
            slot: Mutex::new(ConnectionSlot::default()),
        }
    }

    /// Parses `redis_url` and creates a store. No connection is opened yet.
    ///
    /// `rediss://` URLs connect over TLS.
    pub fn open(redis_url: &str, connect_timeout: Duration) -> AppResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|error| AppError::Validation(format!("invalid redis url: {error}")))?;

        Ok(Self::new(client, connect_timeout))
    }

    /// Overrides how long calls fail fast after a failed connect.
    #[must_use]
    pub fn with_retry_cooldown(mut self, retry_cooldown: Duration) -> Self {
        self.retry_cooldown = retry_cooldown;
        self
    }

    /// Drops the shared connection. The next call reconnects.
    pub async fn disconnect(&self) {
        let mut slot = self.slot.lock().await;
        slot.retry_after = None;
        if slot.connection.take().is_some() {
            info!("disconnected from redis");
        }
    }

    /// Returns whether the store currently answers `PING`.
    pub async fn is_connected(&self) -> bool {
        self.ping().await.is_ok()
    }

    async fn connection(&self) -> AppResult<ConnectionManager> {
        // Bounds the wait for the slot and the connect together.
        tokio::time::timeout(self.connect_timeout, self.shared_connection())
            .await
            .map_err(|_| {
                AppError::Unavailable(format!(
                    "timed out connecting to redis after {} ms",
                    self.connect_timeout.as_millis()
                ))
            })?
    }

    async fn shared_connection(&self) -> AppResult<ConnectionManager> {
        let mut slot = self.slot.lock().await;
        if let Some(connection) = slot.connection.as_ref() {
            return Ok(connection.clone());
        }

        let now = Instant::now();
        if slot.retry_after.is_some_and(|retry_after| retry_after > now) {
            return Err(AppError::Unavailable(
                "redis connect failed recently, waiting before retrying".to_owned(),
            ));
        }

        // Stays in place if this attempt is cancelled by a caller's timeout.
        slot.retry_after = Some(now + self.connect_timeout + self.retry_cooldown);

        let config = ConnectionManagerConfig::new()
            .set_connection_timeout(Some(self.connect_timeout))
            .set_response_timeout(Some(self.connect_timeout));
        match ConnectionManager::new_with_config(self.client.clone(), config).await {
            Ok(connection) => {
                info!("connected to redis");
                slot.retry_after = None;
                slot.connection = Some(connection.clone());
                Ok(connection)
            }
            Err(error) => {
                warn!(error = %error, "redis connect failed");
                slot.retry_after = Some(Instant::now() + self.retry_cooldown);
                Err(AppError::Unavailable(format!(
                    "failed to connect to redis: {error}"
                )))
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut connection = self.connection().await?;
        redis::cmd("GET")
            .arg(key)
            .query_async::<Option<String>>(&mut connection)
            .await
            .map_err(|error| command_error("GET", key, &error))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        let mut command = redis::cmd("SET");
        command.arg(key).arg(value);
        if let Some(ttl) = ttl {
            command.arg("EX").arg(expiry_seconds(ttl)?);
        }

        let mut connection = self.connection().await?;
        command
            .query_async::<()>(&mut connection)
            .await
            .map_err(|error| command_error("SET", key, &error))
    }

    async fn delete(&self, keys: &[String]) -> AppResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut connection = self.connection().await?;
        redis::cmd("DEL")
            .arg(keys)
            .query_async::<u64>(&mut connection)
            .await
            .map_err(|error| command_error("DEL", &keys.join(","), &error))
    }

    async fn increment(&self, key: &str) -> AppResult<i64> {
        let mut connection = self.connection().await?;
        redis::cmd("INCR")
            .arg(key)
            .query_async::<i64>(&mut connection)
            .await
            .map_err(|error| command_error("INCR", key, &error))
    }

    async fn increment_window(&self, key: &str, window: Duration) -> AppResult<(i64, Duration)> {
        let window_seconds = expiry_seconds(window)?;
        let mut connection = self.connection().await?;

        let (count, ttl_seconds): (i64, i64) = Script::new(INCREMENT_WINDOW_SCRIPT)
            .key(key)
            .arg(window_seconds)
            .invoke_async(&mut connection)
            .await
            .map_err(|error| command_error("EVALSHA", key, &error))?;

        let remaining = match KeyTtl::from_seconds(ttl_seconds) {
            KeyTtl::ExpiresIn(remaining) => remaining,
            KeyTtl::Persistent | KeyTtl::Missing => window,
        };
        Ok((count, remaining))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let mut connection = self.connection().await?;
        redis::cmd("EXPIRE")
            .arg(key)
            .arg(whole_seconds(ttl))
            .query_async::<bool>(&mut connection)
            .await
            .map_err(|error| command_error("EXPIRE", key, &error))
    }

    async fn ttl(&self, key: &str) -> AppResult<KeyTtl> {
        let mut connection = self.connection().await?;
        let seconds: i64 = redis::cmd("TTL")
            .arg(key)
            .query_async(&mut connection)
            .await
            .map_err(|error| command_error("TTL", key, &error))?;

        Ok(KeyTtl::from_seconds(seconds))
    }

    async fn keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        let mut connection = self.connection().await?;
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next_cursor, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH_SIZE)
                .query_async(&mut connection)
                .await
                .map_err(|error| command_error("SCAN", pattern, &error))?;

            keys.extend(batch);
            if next_cursor == 0 {
                break;
            }
            cursor = next_cursor;
        }

        // SCAN may return a key more than once.
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut connection = self.connection().await?;
        redis::cmd("EXISTS")
            .arg(key)
            .query_async::<bool>(&mut connection)
            .await
            .map_err(|error| command_error("EXISTS", key, &error))
    }

    async fn ping(&self) -> AppResult<()> {
        let mut connection = self.connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut connection)
            .await
            .map(|_| ())
            .map_err(|error| AppError::Unavailable(format!("redis PING failed: {error}")))
    }
}

fn whole_seconds(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis().div_ceil(1000)).unwrap_or(u64::MAX)
}

/// Converts a TTL to whole seconds for `SET EX`, rounding up.
fn expiry_seconds(ttl: Duration) -> AppResult<u64> {
    let seconds = whole_seconds(ttl);
    if seconds == 0 {
        return Err(AppError::Validation(
            "cache ttl must be greater than zero".to_owned(),
        ));
    }

    Ok(seconds)
}

fn command_error(command: &str, key: &str, error: &redis::RedisError) -> AppError {
    AppError::Unavailable(format!("redis {command} failed for '{key}': {error}"))
}
