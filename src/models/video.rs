use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub video_url: String,
    #[serde(default)]
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVideo {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Video URL is required"))]
    pub video_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl From<CreateVideo> for Video {
    fn from(payload: CreateVideo) -> Self {
        Video {
            id: Uuid::new_v4().to_string(),
            title: payload.title,
            video_url: payload.video_url,
            description: payload.description,
            active: payload.active,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateVideo {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Video URL must not be empty"))]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl UpdateVideo {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.video_url.is_none()
            && self.description.is_none()
            && self.active.is_none()
    }
}

fn default_active_only() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct VideoQuery {
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}
