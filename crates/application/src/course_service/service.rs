use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use coursehub_core::{AppError, AppResult};
use coursehub_domain::{COURSE_LIST_LIMIT, Course, validate_course_id};

use super::ports::CourseRepository;
use crate::cache_service::CacheService;

/// Cache key of the catalog listing.
pub const COURSE_LIST_CACHE_KEY: &str = "courses:list";

/// Key patterns covering every cached catalog entry.
pub const COURSE_CACHE_PATTERNS: [&str; 2] = ["courses:*", "course:*"];

const DEFAULT_LIST_TTL: Duration = Duration::from_secs(300);
const DEFAULT_DETAIL_TTL: Duration = Duration::from_secs(3600);

/// Application service for browsing the course catalog.
#[derive(Clone)]
pub struct CourseService {
    repository: Arc<dyn CourseRepository>,
    cache: CacheService,
    list_ttl: Duration,
    detail_ttl: Duration,
}

impl CourseService {
    /// Creates a new course service.
    #[must_use]
    pub fn new(repository: Arc<dyn CourseRepository>, cache: CacheService) -> Self {
        Self {
            repository,
            cache,
            list_ttl: DEFAULT_LIST_TTL,
            detail_ttl: DEFAULT_DETAIL_TTL,
        }
    }

    /// Overrides how long listings and single courses stay cached.
    #[must_use]
    pub fn with_cache_ttls(mut self, list_ttl: Duration, detail_ttl: Duration) -> Self {
        self.list_ttl = list_ttl;
        self.detail_ttl = detail_ttl;
        self
    }

    /// Returns the catalog listing.
    pub async fn list_courses(&self) -> AppResult<Vec<Course>> {
        let repository = self.repository.clone();
        self.cache
            .get_cached(COURSE_LIST_CACHE_KEY, self.list_ttl, || async move {
                repository.list_courses(COURSE_LIST_LIMIT).await
            })
            .await
    }

    /// Returns one course with its videos.
    ///
    /// Malformed identifiers are rejected before the cache or repository is
    /// touched, so they never leave a cached miss behind.
    pub async fn get_course(&self, course_id: &str) -> AppResult<Course> {
        let course_id = course_id.trim();
        validate_course_id(course_id)?;
        let repository = self.repository.clone();
        let lookup_id = course_id.to_owned();

        let course: Option<Course> = self
            .cache
            .get_cached(
                &format!("course:{course_id}"),
                self.detail_ttl,
                || async move { repository.find_course(&lookup_id).await },
            )
            .await?;

        course.ok_or_else(|| AppError::NotFound(format!("course '{course_id}' does not exist")))
    }

    /// Drops every cached catalog entry and returns how many were removed.
    pub async fn invalidate_catalog(&self) -> u64 {
        let mut removed = 0;
        for pattern in COURSE_CACHE_PATTERNS {
            removed += self.cache.invalidate(pattern).await;
        }

        info!(removed, "invalidated course catalog cache");
        removed
    }
}
