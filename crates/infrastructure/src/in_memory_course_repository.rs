use async_trait::async_trait;
use tokio::sync::RwLock;

use coursehub_application::CourseRepository;
use coursehub_core::AppResult;
use coursehub_domain::Course;

/// Vector-backed course catalog used as a test double for the HTTP layer.
///
/// The API binary always reads the catalog from Postgres and answers 503
/// without `DATABASE_URL`.
#[derive(Default)]
pub struct InMemoryCourseRepository {
    courses: RwLock<Vec<Course>>,
}

impl InMemoryCourseRepository {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-filled with `courses`.
    #[must_use]
    pub fn with_courses(courses: Vec<Course>) -> Self {
        Self {
            courses: RwLock::new(courses),
        }
    }

    /// Inserts or replaces a course by id.
    pub async fn save_course(&self, course: Course) {
        let mut courses = self.courses.write().await;
        match courses.iter_mut().find(|existing| existing.id == course.id) {
            Some(existing) => *existing = course,
            None => courses.push(course),
        }
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn list_courses(&self, limit: u32) -> AppResult<Vec<Course>> {
        let mut courses = self.courses.read().await.clone();
        courses.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        courses.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        courses.iter_mut().for_each(Course::sort_videos);

        Ok(courses)
    }

    async fn find_course(&self, course_id: &str) -> AppResult<Option<Course>> {
        Ok(self
            .courses
            .read()
            .await
            .iter()
            .find(|course| course.id == course_id)
            .cloned()
            .map(|mut course| {
                course.sort_videos();
                course
            }))
    }
}
