//! Course catalog records served by the public API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on courses returned by one catalog listing.
pub const COURSE_LIST_LIMIT: u32 = 100;

/// A course with its ordered videos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Stable course identifier (slug).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Long description.
    pub description: String,
    /// Price in the smallest currency unit.
    pub price: i64,
    /// Cover image location.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Videos ordered by position.
    pub videos: Vec<Video>,
}

impl Course {
    /// Orders videos by ascending position.
    pub fn sort_videos(&mut self) {
        self.videos.sort_by_key(|video| video.position);
    }
}

/// One video lesson of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Stable video identifier.
    pub id: String,
    /// Owning course.
    pub course_id: String,
    /// Display title.
    pub title: String,
    /// Optional summary.
    pub description: Option<String>,
    /// Playback location.
    pub url: String,
    /// 1-based order inside the course.
    pub position: i32,
}
