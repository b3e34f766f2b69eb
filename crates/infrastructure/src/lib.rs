//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_course_repository;
mod in_memory_key_value_store;
mod in_memory_rate_limit_window_store;
mod postgres_course_repository;
mod redis_key_value_store;

pub use in_memory_course_repository::InMemoryCourseRepository;
pub use in_memory_key_value_store::InMemoryKeyValueStore;
pub use in_memory_rate_limit_window_store::InMemoryRateLimitWindowStore;
pub use postgres_course_repository::PostgresCourseRepository;
pub use redis_key_value_store::RedisKeyValueStore;
