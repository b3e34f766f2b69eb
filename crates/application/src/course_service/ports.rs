use async_trait::async_trait;

use coursehub_core::AppResult;
use coursehub_domain::Course;

/// Repository port for the course catalog.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Lists at most `limit` courses ordered by creation time, with videos ordered by position.
    async fn list_courses(&self, limit: u32) -> AppResult<Vec<Course>>;

    /// Finds one course with its videos ordered by position.
    async fn find_course(&self, course_id: &str) -> AppResult<Option<Course>>;
}
