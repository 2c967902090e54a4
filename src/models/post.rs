// src/models/post.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::render;

/// One row of the 'posts' table joined with its author's username.
#[derive(Debug, Clone, FromRow)]
pub struct PostRecord {
    pub id: i64,
    pub user_id: i64,
    pub author_username: String,
    pub title: String,
    pub content: String,
    pub is_private: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// API representation of a post.
///
/// `title_html` and `content_html` are produced by the content rendering
/// pipeline and are safe to embed into a page without further escaping;
/// the raw Markdown fields are included for editing clients.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub user_id: i64,
    pub author_username: String,
    pub title: String,
    pub title_html: String,
    pub content: String,
    pub content_html: String,
    pub is_private: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<PostRecord> for PostResponse {
    fn from(record: PostRecord) -> Self {
        let title_html = render::render_title(&record.title);
        let content_html = render::render_body(&record.content);
        Self {
            id: record.id,
            user_id: record.user_id,
            author_username: record.author_username,
            title: record.title,
            title_html,
            content: record.content,
            content_html,
            is_private: record.is_private,
            created_at: record.created_at,
        }
    }
}

/// DTO for creating a new post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(
        min = 1,
        max = 140,
        message = "Title length must be between 1 and 140 chars"
    ))]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content length must be between 1 and 10000 chars"
    ))]
    pub content: String,

    /// Private posts are visible to their author only.
    #[serde(default)]
    pub is_private: bool,
}

/// Query parameters for listing posts.
#[derive(Debug, Deserialize)]
pub struct PostListParams {
    /// Cursor for pagination: the created_at timestamp of the last post in the previous page.
    pub cursor: Option<chrono::DateTime<chrono::Utc>>,

    /// Number of items to return (default: 20, max: 100).
    pub limit: Option<i64>,
}
