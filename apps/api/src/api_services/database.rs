use coursehub_core::AppError;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::api_config::DatabasePoolConfig;

/// Catalog schema: `courses` and `videos`.
static CATALOG_MIGRATOR: Migrator = sqlx::migrate!("../../crates/infrastructure/migrations");

/// Opens the catalog pool and brings the schema up to date.
pub async fn connect_and_migrate(
    database_url: &str,
    pool_config: DatabasePoolConfig,
) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(pool_config.max_connections)
        .acquire_timeout(pool_config.acquire_timeout)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Unavailable(format!("catalog database unreachable: {error}")))?;

    CATALOG_MIGRATOR
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("catalog migrations failed: {error}")))?;

    info!(
        max_connections = pool_config.max_connections,
        migrations = CATALOG_MIGRATOR.iter().count(),
        "catalog database ready"
    );
    Ok(pool)
}
