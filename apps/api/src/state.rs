use std::sync::Arc;

use coursehub_application::{CacheService, CourseService, KeyValueStore, RateLimitService};
use coursehub_core::{AppError, AppResult};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub rate_limit_service: RateLimitService,
    pub cache_service: CacheService,
    pub course_service: Option<CourseService>,
    pub key_value_store: Option<Arc<dyn KeyValueStore>>,
    pub postgres_pool: Option<PgPool>,
    pub cache_admin_token: Option<String>,
}

impl AppState {
    /// Returns the course service, or `Unavailable` when no database is configured.
    pub fn course_service(&self) -> AppResult<&CourseService> {
        self.course_service.as_ref().ok_or_else(|| {
            AppError::Unavailable("the course database is not configured".to_owned())
        })
    }
}
