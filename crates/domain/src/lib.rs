//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod cache;
mod course;
mod rate_limit;
pub mod validation;

pub use cache::CacheEntry;
pub use course::{COURSE_LIST_LIMIT, Course, Video};
pub use rate_limit::{RATE_LIMIT_KEY_PREFIX, RateLimitDecision, RateLimitRecord, RateLimitRule};
pub use validation::{validate_cache_pattern, validate_course_id};
