use std::sync::Arc;

use coursehub_application::KeyValueStore;

use super::*;

pub(super) async fn check_postgres(pool: Option<sqlx::PgPool>) -> HealthDependencyStatus {
    let Some(pool) = pool else {
        return HealthDependencyStatus::disabled();
    };

    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&pool).await {
        Ok(_) => HealthDependencyStatus::ok(),
        Err(error) => HealthDependencyStatus::error(format!("postgres check failed: {error}")),
    }
}

pub(super) async fn check_key_value_store(
    store: Option<Arc<dyn KeyValueStore>>,
) -> HealthDependencyStatus {
    let Some(store) = store else {
        return HealthDependencyStatus::disabled();
    };

    match store.ping().await {
        Ok(()) => HealthDependencyStatus::ok(),
        Err(error) => HealthDependencyStatus::error(format!("key-value store ping failed: {error}")),
    }
}
