//! Application services and ports.

#![forbid(unsafe_code)]

mod cache_service;
mod course_service;
mod key_value_ports;
mod rate_limit_service;

#[cfg(test)]
mod test_support;

pub use cache_service::CacheService;
pub use course_service::{
    COURSE_CACHE_PATTERNS, COURSE_LIST_CACHE_KEY, CourseRepository, CourseService,
};
pub use key_value_ports::{KeyTtl, KeyValueStore};
pub use rate_limit_service::{RateLimitService, RateLimitWindowStore};
