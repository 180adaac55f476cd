use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A timestamped free-text note attached to a piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyNote {
    pub id: Uuid,
    pub content_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl StudyNote {
    pub fn new(content_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content_id: content_id.into(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Bookmark flag for a piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub content_id: String,
    pub bookmarked: bool,
    pub updated_at: DateTime<Utc>,
}
