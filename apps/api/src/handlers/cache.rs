use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use coursehub_application::COURSE_CACHE_PATTERNS;
use coursehub_core::AppError;
use coursehub_domain::validate_cache_pattern;
use tracing::info;

use crate::dto::{InvalidateCacheRequest, InvalidateCacheResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Deletes cached entries matching the requested pattern, or the whole
/// course catalog when the body is empty or carries no pattern.
pub async fn invalidate_cache_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<InvalidateCacheResponse>> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        InvalidateCacheRequest::default()
    } else {
        serde_json::from_slice::<InvalidateCacheRequest>(&body).map_err(|error| {
            AppError::Validation(format!("invalid cache invalidation payload: {error}"))
        })?
    };

    let pattern = request
        .pattern
        .map(|pattern| pattern.trim().to_owned())
        .filter(|pattern| !pattern.is_empty());

    let response = match pattern {
        Some(pattern) => {
            validate_cache_pattern(&pattern)?;
            let removed = state.cache_service.invalidate(&pattern).await;
            info!(pattern = %pattern, removed, "cache entries invalidated");
            InvalidateCacheResponse {
                patterns: vec![pattern],
                removed,
            }
        }
        None => InvalidateCacheResponse {
            patterns: COURSE_CACHE_PATTERNS
                .iter()
                .map(|pattern| (*pattern).to_owned())
                .collect(),
            removed: invalidate_catalog(&state).await,
        },
    };

    Ok(Json(response))
}

async fn invalidate_catalog(state: &AppState) -> u64 {
    if let Some(course_service) = &state.course_service {
        return course_service.invalidate_catalog().await;
    }

    let mut removed = 0;
    for pattern in COURSE_CACHE_PATTERNS {
        removed += state.cache_service.invalidate(pattern).await;
    }
    removed
}
