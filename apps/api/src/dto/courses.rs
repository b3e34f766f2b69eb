use coursehub_domain::{Course, Video};
use serde::Serialize;
use ts_rs::TS;

/// API representation of a course with its videos.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/course-response.ts"
)]
pub struct CourseResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Price in the smallest currency unit.
    pub price: i64,
    pub image_url: Option<String>,
    /// RFC 3339 timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp.
    pub updated_at: String,
    pub videos: Vec<VideoResponse>,
}

/// API representation of one course video.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/video-response.ts"
)]
pub struct VideoResponse {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub position: i32,
}

impl From<Course> for CourseResponse {
    fn from(value: Course) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            price: value.price,
            image_url: value.image_url,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
            videos: value.videos.into_iter().map(VideoResponse::from).collect(),
        }
    }
}

impl From<Video> for VideoResponse {
    fn from(value: Video) -> Self {
        Self {
            id: value.id,
            course_id: value.course_id,
            title: value.title,
            description: value.description,
            url: value.url,
            position: value.position,
        }
    }
}
