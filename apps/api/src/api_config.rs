use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use coursehub_core::AppError;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyValueStoreConfig {
    Disabled,
    InMemory,
    Redis { url: String },
}

/// Postgres pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabasePoolConfig {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub database_url: Option<String>,
    pub database_pool: DatabasePoolConfig,
    pub key_value_store: KeyValueStoreConfig,
    pub redis_connect_timeout: Duration,
    pub redis_retry_cooldown: Duration,
    pub rate_limit_sweep_interval: Duration,
    pub course_list_cache_ttl: Duration,
    pub course_detail_cache_ttl: Duration,
    pub cache_admin_token: Option<String>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());

        let database_pool = DatabasePoolConfig {
            max_connections: u32::try_from(parse_positive(
                "DATABASE_MAX_CONNECTIONS",
                lookup("DATABASE_MAX_CONNECTIONS"),
                10,
            )?)
            .map_err(|_| {
                AppError::Validation("DATABASE_MAX_CONNECTIONS is out of range".to_owned())
            })?,
            acquire_timeout: Duration::from_secs(parse_positive(
                "DATABASE_ACQUIRE_TIMEOUT_SECONDS",
                lookup("DATABASE_ACQUIRE_TIMEOUT_SECONDS"),
                5,
            )?),
        };

        let key_value_store =
            key_value_store_config(lookup("KEY_VALUE_STORE"), lookup("REDIS_URL"))?;

        let redis_connect_timeout = Duration::from_millis(parse_positive(
            "REDIS_CONNECT_TIMEOUT_MS",
            lookup("REDIS_CONNECT_TIMEOUT_MS"),
            5000,
        )?);
        let redis_retry_cooldown = Duration::from_millis(parse_seconds(
            "REDIS_RETRY_COOLDOWN_MS",
            lookup("REDIS_RETRY_COOLDOWN_MS"),
            1000,
        )?);
        let rate_limit_sweep_interval = Duration::from_secs(parse_positive(
            "RATE_LIMIT_SWEEP_INTERVAL_SECONDS",
            lookup("RATE_LIMIT_SWEEP_INTERVAL_SECONDS"),
            300,
        )?);
        let course_list_cache_ttl = Duration::from_secs(parse_seconds(
            "COURSE_LIST_CACHE_TTL_SECONDS",
            lookup("COURSE_LIST_CACHE_TTL_SECONDS"),
            300,
        )?);
        let course_detail_cache_ttl = Duration::from_secs(parse_seconds(
            "COURSE_DETAIL_CACHE_TTL_SECONDS",
            lookup("COURSE_DETAIL_CACHE_TTL_SECONDS"),
            3600,
        )?);

        Ok(Self {
            migrate_only,
            api_host,
            api_port,
            frontend_url,
            database_url: lookup("DATABASE_URL"),
            database_pool,
            key_value_store,
            redis_connect_timeout,
            redis_retry_cooldown,
            rate_limit_sweep_interval,
            course_list_cache_ttl,
            course_detail_cache_ttl,
            cache_admin_token: lookup("CACHE_ADMIN_TOKEN"),
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn key_value_store_config(
    backend: Option<String>,
    redis_url: Option<String>,
) -> Result<KeyValueStoreConfig, AppError> {
    let redis_url = match redis_url {
        Some(url) if is_supported_redis_url(&url) => Some(url),
        Some(_) => {
            warn!("REDIS_URL is not a redis://, rediss:// or Upstash URL, ignoring it");
            None
        }
        None => None,
    };

    match backend.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(redis_url.map_or(KeyValueStoreConfig::Disabled, |url| {
            KeyValueStoreConfig::Redis { url }
        })),
        Some("redis") => redis_url
            .map(|url| KeyValueStoreConfig::Redis { url })
            .ok_or_else(|| {
                AppError::Validation(
                    "a valid REDIS_URL is required when KEY_VALUE_STORE=redis".to_owned(),
                )
            }),
        Some("memory") => Ok(KeyValueStoreConfig::InMemory),
        Some("none") => Ok(KeyValueStoreConfig::Disabled),
        Some(other) => Err(AppError::Validation(format!(
            "KEY_VALUE_STORE must be one of 'redis', 'memory' or 'none', got '{other}'"
        ))),
    }
}

fn is_supported_redis_url(url: &str) -> bool {
    url.starts_with("redis://") || url.starts_with("rediss://") || url.contains("upstash.io")
}

fn parse_seconds(name: &str, value: Option<String>, default: u64) -> Result<u64, AppError> {
    value.map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<u64>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
    })
}

fn parse_positive(name: &str, value: Option<String>, default: u64) -> Result<u64, AppError> {
    let parsed = parse_seconds(name, value, default)?;
    if parsed == 0 {
        return Err(AppError::Validation(format!(
            "{name} must be greater than zero"
        )));
    }

    Ok(parsed)
}
