// src/handlers/comments.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::posts::ensure_post_visible,
    models::comment::{CommentRecord, CommentResponse, CreateCommentRequest},
    utils::jwt::{Claims, OptionalClaims},
};

/// List all comments for a post (oldest first), bodies rendered to safe HTML.
/// Post visibility rules apply: comments on a private post are the author's.
pub async fn list_comments(
    State(pool): State<PgPool>,
    Extension(viewer): Extension<OptionalClaims>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ensure_post_visible(&pool, post_id, viewer.user_id()).await?;

    let records = sqlx::query_as::<_, CommentRecord>(
        r#"
        SELECT c.id, c.post_id, c.user_id, u.username, c.content, c.created_at
        FROM comments c
        JOIN users u ON c.user_id = u.id
        WHERE c.post_id = $1 AND c.deleted_at IS NULL
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(&pool)
    .await?;

    let comments: Vec<CommentResponse> = records.into_iter().map(CommentResponse::from).collect();
    Ok(Json(comments))
}

/// Add a comment to a visible post. Requires login.
pub async fn create_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    ensure_post_visible(&pool, post_id, Some(user_id)).await?;

    let new_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO comments (post_id, user_id, content)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .bind(&payload.content)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create comment: {:?}", e);
        AppError::from(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": new_id })),
    ))
}
