use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use coursehub_application::CourseRepository;
use coursehub_core::{AppError, AppResult};
use coursehub_domain::{Course, Video};


/// PostgreSQL-backed repository for the course catalog.
#[derive(Clone)]
pub struct PostgresCourseRepository {
    pool: PgPool,
}

impl PostgresCourseRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_videos(&self, course_ids: &[String]) -> AppResult<HashMap<String, Vec<Video>>> {
        if course_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, VideoRow>(
            r#"
            SELECT id, course_id, title, description, url, position
            FROM videos
            WHERE course_id = ANY($1)
            ORDER BY course_id, position ASC
            "#,
        )
        .bind(course_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load course videos: {error}")))?;

        let mut videos: HashMap<String, Vec<Video>> = HashMap::new();
        for row in rows {
            videos
                .entry(row.course_id.clone())
                .or_default()
                .push(row.into());
        }

        Ok(videos)
    }
}

#[derive(Debug, FromRow)]
struct CourseRow {
    id: String,
    title: String,
    description: String,
    price: i64,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CourseRow {
    fn into_course(self, videos: Vec<Video>) -> Course {
        let mut course = Course {
            id: self.id,
            title: self.title,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
            videos,
        };
        course.sort_videos();
        course
    }
}

#[derive(Debug, FromRow)]
struct VideoRow {
    id: String,
    course_id: String,
    title: String,
    description: Option<String>,
    url: String,
    position: i32,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Self {
            id: row.id,
            course_id: row.course_id,
            title: row.title,
            description: row.description,
            url: row.url,
            position: row.position,
        }
    }
}

#[async_trait]
impl CourseRepository for PostgresCourseRepository {
    async fn list_courses(&self, limit: u32) -> AppResult<Vec<Course>> {
        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, title, description, price, image_url, created_at, updated_at
            FROM courses
            ORDER BY created_at ASC, id ASC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list courses: {error}")))?;

        let course_ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
        let mut videos = self.load_videos(&course_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let course_videos = videos.remove(&row.id).unwrap_or_default();
                row.into_course(course_videos)
            })
            .collect())
    }

    async fn find_course(&self, course_id: &str) -> AppResult<Option<Course>> {
        let row = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, title, description, price, image_url, created_at, updated_at
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load course '{course_id}': {error}"))
        })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut videos = self.load_videos(std::slice::from_ref(&row.id)).await?;
        let course_videos = videos.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_course(course_videos)))
    }
}
