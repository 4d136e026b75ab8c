use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookbookItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLookbookItem {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Image URL is required"))]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
}

impl From<CreateLookbookItem> for LookbookItem {
    fn from(payload: CreateLookbookItem) -> Self {
        LookbookItem {
            id: Uuid::new_v4().to_string(),
            title: payload.title,
            image_url: payload.image_url,
            description: payload.description,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateLookbookItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Image URL must not be empty"))]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateLookbookItem {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.image_url.is_none() && self.description.is_none()
    }
}
