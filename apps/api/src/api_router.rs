use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use coursehub_core::AppError;
use coursehub_domain::RateLimitRule;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;


pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let cors_layer = cors::build_cors_layer(frontend_url)?;

    // Route layers run in reverse order of registration, so the rate limit
    // is counted before the admin token is checked.
    let course_list_routes = Router::new()
        .route("/api/courses", get(handlers::courses::list_courses_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::rate_limit,
        ))
        .layer(axum::Extension(RateLimitRule::per_minute("courses", 30)?));

    let course_detail_routes = Router::new()
        .route(
            "/api/courses/{course_id}",
            get(handlers::courses::get_course_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::rate_limit,
        ))
        .layer(axum::Extension(RateLimitRule::per_minute("course", 20)?));

    let mut router = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(course_list_routes)
        .merge(course_detail_routes);

    if app_state.cache_admin_token.is_some() {
        let cache_admin_routes = Router::new()
            .route(
                "/api/cache/invalidate",
                post(handlers::cache::invalidate_cache_handler),
            )
            .route_layer(from_fn_with_state(
                app_state.clone(),
                middleware::require_cache_admin,
            ))
            .route_layer(from_fn_with_state(
                app_state.clone(),
                middleware::rate_limit,
            ))
            .layer(axum::Extension(RateLimitRule::per_minute(
                "cache-invalidate",
                5,
            )?));
        router = router.merge(cache_admin_routes);
    }

    Ok(router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
