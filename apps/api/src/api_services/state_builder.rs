use std::sync::Arc;

use coursehub_application::{CacheService, CourseService, RateLimitService};
use coursehub_infrastructure::{InMemoryRateLimitWindowStore, PostgresCourseRepository};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

use super::KeyValueBackend;

pub fn build_app_state(
    config: &ApiConfig,
    pool: Option<PgPool>,
    key_value: &KeyValueBackend,
) -> AppState {
    let mut rate_limit_service =
        RateLimitService::new(Arc::new(InMemoryRateLimitWindowStore::new()));
    let cache_service = match &key_value.store {
        Some(store) => {
            rate_limit_service = rate_limit_service.with_shared_store(store.clone());
            CacheService::new(store.clone())
        }
        None => CacheService::disabled(),
    };

    let course_service = pool.as_ref().map(|pool| {
        CourseService::new(
            Arc::new(PostgresCourseRepository::new(pool.clone())),
            cache_service.clone(),
        )
        .with_cache_ttls(config.course_list_cache_ttl, config.course_detail_cache_ttl)
    });

    AppState {
        rate_limit_service,
        cache_service,
        course_service,
        key_value_store: key_value.store.clone(),
        postgres_pool: pool,
        cache_admin_token: config.cache_admin_token.clone(),
    }
}
