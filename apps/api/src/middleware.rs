use axum::extract::{RawPathParams, Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use coursehub_core::AppError;
use coursehub_domain::{RateLimitDecision, RateLimitRule};
use tracing::warn;

use crate::error::{ApiResult, ErrorResponse};
use crate::state::AppState;

/// Client address used in rate limit identifiers when no proxy header is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Counts the request against the route's [`RateLimitRule`].
///
/// The identifier is the rule category followed by every path parameter and
/// the client address, e.g. `course:devsecops:203.0.113.7`.
pub async fn rate_limit(
    State(state): State<AppState>,
    Extension(rule): Extension<RateLimitRule>,
    path_params: RawPathParams,
    request: Request,
    next: Next,
) -> Response {
    let client_ip = client_ip(request.headers());
    let mut subject: Vec<&str> = path_params.iter().map(|(_, value)| value).collect();
    subject.push(client_ip.as_str());
    let identifier = rule.identifier(&subject.join(":"));

    let decision = state
        .rate_limit_service
        .check_rate_limit(&rule, &identifier)
        .await;

    if !decision.allowed {
        warn!(identifier = %identifier, limit = decision.limit, "rate limit exceeded");
        return rate_limited_response(&decision);
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    response
}

/// Requires `Authorization: Bearer <CACHE_ADMIN_TOKEN>`.
pub async fn require_cache_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let Some(expected) = state.cache_admin_token.as_deref() else {
        return Err(AppError::Unauthorized("cache administration is disabled".to_owned()).into());
    };

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    if !provided.is_some_and(|token| tokens_match(token, expected)) {
        return Err(AppError::Unauthorized("invalid cache admin token".to_owned()).into());
    }

    Ok(next.run(request).await)
}

/// Resolves the caller address from proxy headers.
pub fn client_ip(headers: &HeaderMap) -> String {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };

    header_value("x-forwarded-for")
        .and_then(|value| value.split(',').next().map(|first| first.trim().to_owned()))
        .filter(|value| !value.is_empty())
        .or_else(|| {
            header_value("x-real-ip")
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        })
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned())
}

fn rate_limited_response(decision: &RateLimitDecision) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse::rate_limited()),
    )
        .into_response();

    let headers = response.headers_mut();
    headers.insert(
        header::RETRY_AFTER,
        HeaderValue::from(decision.retry_after_seconds(Utc::now())),
    );
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(0_u32));
    headers.insert(
        "x-ratelimit-reset",
        HeaderValue::from(decision.reset_at_millis()),
    );
    response
}

fn tokens_match(provided: &str, expected: &str) -> bool {
    provided.len() == expected.len()
        && provided
            .bytes()
            .zip(expected.bytes())
            .fold(0_u8, |difference, (left, right)| difference | (left ^ right))
            == 0
}
