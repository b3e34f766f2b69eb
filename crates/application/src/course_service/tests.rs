use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use coursehub_core::{AppError, AppResult};
use coursehub_domain::{Course, Video};

use crate::CacheService;
use crate::test_support::{FailingKeyValueStore, FakeKeyValueStore};

use super::{COURSE_LIST_CACHE_KEY, CourseRepository, CourseService};

struct FakeCourseRepository {
    courses: Vec<Course>,
    list_calls: AtomicUsize,
    find_calls: AtomicUsize,
    last_limit: AtomicUsize,
}

impl FakeCourseRepository {
    fn with_courses(courses: Vec<Course>) -> Self {
        Self {
            courses,
            list_calls: AtomicUsize::new(0),
            find_calls: AtomicUsize::new(0),
            last_limit: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CourseRepository for FakeCourseRepository {
    async fn list_courses(&self, limit: u32) -> AppResult<Vec<Course>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.last_limit
            .store(usize::try_from(limit).unwrap_or_default(), Ordering::SeqCst);
        Ok(self.courses.clone())
    }

    async fn find_course(&self, course_id: &str) -> AppResult<Option<Course>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .courses
            .iter()
            .find(|course| course.id == course_id)
            .cloned())
    }
}

fn course(id: &str) -> Course {
    let created_at = Utc
        .with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or_default();
    Course {
        id: id.to_owned(),
        title: format!("{id} title"),
        description: "Hands-on track".to_owned(),
        price: 99_000,
        image_url: Some(format!("/images/{id}.png")),
        created_at,
        updated_at: created_at,
        videos: vec![Video {
            id: format!("{id}-intro"),
            course_id: id.to_owned(),
            title: "Introduction".to_owned(),
            description: None,
            url: format!("https://videos.example.com/{id}/intro"),
            position: 1,
        }],
    }
}

fn service_with(
    repository: Arc<FakeCourseRepository>,
    store: Arc<FakeKeyValueStore>,
) -> CourseService {
    CourseService::new(repository, CacheService::new(store))
}

#[tokio::test]
async fn listing_is_cached_with_list_ttl() {
    let repository = Arc::new(FakeCourseRepository::with_courses(vec![
        course("devsecops"),
        course("cloud"),
    ]));
    let store = Arc::new(FakeKeyValueStore::default());
    let service = service_with(repository.clone(), store.clone());

    let first = service.list_courses().await.unwrap_or_default();
    let second = service.list_courses().await.unwrap_or_default();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    assert_eq!(repository.list_calls.load(Ordering::SeqCst), 1);
    assert_eq!(repository.last_limit.load(Ordering::SeqCst), 100);
    assert_eq!(
        store.recorded_ttl(COURSE_LIST_CACHE_KEY),
        Some(Duration::from_secs(300))
    );
}

#[tokio::test]
async fn course_detail_is_cached_per_id() {
    let repository = Arc::new(FakeCourseRepository::with_courses(vec![course("cloud")]));
    let store = Arc::new(FakeKeyValueStore::default());
    let service = service_with(repository.clone(), store.clone()).with_cache_ttls(
        Duration::from_secs(30),
        Duration::from_secs(120),
    );

    for _ in 0..2 {
        let found = service.get_course("cloud").await;
        assert!(matches!(found, Ok(ref found) if found.id == "cloud" && found.videos.len() == 1));
    }

    assert_eq!(repository.find_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        store.recorded_ttl("course:cloud"),
        Some(Duration::from_secs(120))
    );
}

#[tokio::test]
async fn missing_course_is_not_found_and_cached_as_null() {
    let repository = Arc::new(FakeCourseRepository::with_courses(Vec::new()));
    let store = Arc::new(FakeKeyValueStore::default());
    let service = service_with(repository.clone(), store.clone());

    for _ in 0..2 {
        let result = service.get_course("ghost").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    assert_eq!(repository.find_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.raw("course:ghost").as_deref(), Some("null"));
}

#[tokio::test]
async fn blank_course_id_is_rejected() {
    let repository = Arc::new(FakeCourseRepository::with_courses(Vec::new()));
    let service = service_with(repository.clone(), Arc::new(FakeKeyValueStore::default()));

    let result = service.get_course("   ").await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(repository.find_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_course_ids_leave_no_cache_entry() {
    let repository = Arc::new(FakeCourseRepository::with_courses(Vec::new()));
    let store = Arc::new(FakeKeyValueStore::default());
    let service = service_with(repository.clone(), store.clone());

    let oversized = "x".repeat(101);
    for course_id in ["../admin", "cloud:basics", "a*", oversized.as_str()] {
        let result = service.get_course(course_id).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    assert_eq!(repository.find_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.set_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unavailable_store_reads_from_repository_every_time() {
    let repository = Arc::new(FakeCourseRepository::with_courses(vec![course("cloud")]));
    let service = CourseService::new(
        repository.clone(),
        CacheService::new(Arc::new(FailingKeyValueStore::default())),
    );

    for _ in 0..3 {
        assert!(service.get_course("cloud").await.is_ok());
    }

    assert_eq!(repository.find_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn invalidate_catalog_clears_listing_and_details() {
    let repository = Arc::new(FakeCourseRepository::with_courses(vec![course("cloud")]));
    let store = Arc::new(FakeKeyValueStore::default());
    store.insert("ratelimit:courses:10.0.0.1", "1", None);
    let service = service_with(repository.clone(), store.clone());

    assert!(service.list_courses().await.is_ok());
    assert!(service.get_course("cloud").await.is_ok());

    assert_eq!(service.invalidate_catalog().await, 2);
    assert!(store.raw(COURSE_LIST_CACHE_KEY).is_none());
    assert!(store.raw("course:cloud").is_none());
    assert!(store.raw("ratelimit:courses:10.0.0.1").is_some());

    assert!(service.list_courses().await.is_ok());
    assert_eq!(repository.list_calls.load(Ordering::SeqCst), 2);
}
