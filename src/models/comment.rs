// src/models/comment.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::render;

/// One row of the 'comments' table joined with its author's username.
#[derive(Debug, Clone, FromRow)]
pub struct CommentRecord {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub username: String,
    pub content: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// API representation of a comment, with the body rendered to safe HTML.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub username: String,
    pub content: String,
    pub content_html: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<CommentRecord> for CommentResponse {
    fn from(record: CommentRecord) -> Self {
        let content_html = render::render_body(&record.content);
        Self {
            id: record.id,
            post_id: record.post_id,
            user_id: record.user_id,
            username: record.username,
            content: record.content,
            content_html,
            created_at: record.created_at,
        }
    }
}

/// DTO for creating a new comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Comment must be between 1 and 1000 characters"
    ))]
    pub content: String,
}
