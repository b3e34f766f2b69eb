//! Input validation rules shared by the catalog service and request handlers.
//!
//! These checks are structural only. They run before any store or database
//! lookup so malformed input never reaches a cache key.

use coursehub_core::{AppError, AppResult};

/// Maximum accepted course identifier length.
pub const COURSE_ID_MAX_LENGTH: usize = 100;

/// Maximum accepted cache invalidation pattern length.
pub const CACHE_PATTERN_MAX_LENGTH: usize = 256;

/// Returns whether `course_id` is 1 to 100 characters of `[A-Za-z0-9_-]`.
#[must_use]
pub fn is_valid_course_id(course_id: &str) -> bool {
    (1..=COURSE_ID_MAX_LENGTH).contains(&course_id.len())
        && course_id
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
}

/// Validates a course identifier taken from a request path.
pub fn validate_course_id(course_id: &str) -> AppResult<()> {
    if is_valid_course_id(course_id) {
        return Ok(());
    }

    Err(AppError::Validation(format!(
        "course id must be 1 to {COURSE_ID_MAX_LENGTH} letters, digits, '-' or '_'"
    )))
}

/// Validates a key pattern supplied to cache invalidation.
///
/// Patterns must be non-blank, printable, free of whitespace and at most
/// [`CACHE_PATTERN_MAX_LENGTH`] characters.
pub fn validate_cache_pattern(pattern: &str) -> AppResult<()> {
    if pattern.is_empty() {
        return Err(AppError::Validation(
            "cache pattern must not be empty".to_owned(),
        ));
    }

    if pattern.chars().count() > CACHE_PATTERN_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "cache pattern must not exceed {CACHE_PATTERN_MAX_LENGTH} characters"
        )));
    }

    if pattern
        .chars()
        .any(|character| character.is_whitespace() || character.is_control())
    {
        return Err(AppError::Validation(
            "cache pattern must not contain whitespace or control characters".to_owned(),
        ));
    }

    Ok(())
}
