use super::checks::{check_key_value_store, check_postgres};
use super::*;

/// Reports dependency status. Always answers 200: a broken key-value store
/// degrades the service without taking it down.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = check_postgres(state.postgres_pool.clone()).await;
    let key_value_store = check_key_value_store(state.key_value_store.clone()).await;

    let degraded = is_error(database.status) || is_error(key_value_store.status);
    let status = if degraded { "degraded" } else { "ok" };

    Json(HealthResponse {
        status,
        key_value_store,
        database,
    })
}

fn is_error(status: &str) -> bool {
    status == "error"
}
