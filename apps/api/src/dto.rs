mod cache;
mod common;
mod courses;

pub use cache::{InvalidateCacheRequest, InvalidateCacheResponse};
pub use common::{HealthDependencyStatus, HealthResponse};
pub use courses::{CourseResponse, VideoResponse};
