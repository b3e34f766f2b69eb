use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use crate::dto::CourseResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// Shared cache policy for the course listing.
pub const COURSE_LIST_CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=600";

/// Shared cache policy for a single course.
pub const COURSE_DETAIL_CACHE_CONTROL: &str = "public, s-maxage=3600, stale-while-revalidate=7200";

pub async fn list_courses_handler(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let courses = state
        .course_service()?
        .list_courses()
        .await?
        .into_iter()
        .map(CourseResponse::from)
        .collect::<Vec<_>>();

    Ok((
        [(header::CACHE_CONTROL, COURSE_LIST_CACHE_CONTROL)],
        Json(courses),
    ))
}

pub async fn get_course_handler(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let course = state.course_service()?.get_course(&course_id).await?;

    Ok((
        [(header::CACHE_CONTROL, COURSE_DETAIL_CACHE_CONTROL)],
        Json(CourseResponse::from(course)),
    ))
}
