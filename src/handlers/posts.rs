// src/handlers/posts.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::post::{CreatePostRequest, PostListParams, PostRecord, PostResponse},
    utils::jwt::{Claims, OptionalClaims},
};

/// Create a new post. Requires login.
pub async fn create_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    let post_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO posts (user_id, title, content, is_private)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(&payload.title)
    .bind(&payload.content)
    .bind(payload.is_private)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create post: {:?}", e);
        AppError::from(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": post_id })),
    ))
}

/// List posts visible to the viewer (recent first).
///
/// Anonymous viewers see public posts only; an authenticated viewer also
/// sees their own private posts. Supports cursor-based pagination.
pub async fn list_posts(
    State(pool): State<PgPool>,
    Extension(viewer): Extension<OptionalClaims>,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);

    let records = sqlx::query_as::<_, PostRecord>(
        r#"
        SELECT p.id, p.user_id, u.username AS author_username,
               p.title, p.content, p.is_private, p.created_at
        FROM posts p
        JOIN users u ON p.user_id = u.id
        WHERE p.deleted_at IS NULL
          AND (NOT p.is_private OR p.user_id = $1)
          AND ($2::TIMESTAMPTZ IS NULL OR p.created_at < $2)
        ORDER BY p.created_at DESC
        LIMIT $3
        "#,
    )
    .bind(viewer.user_id())
    .bind(params.cursor)
    .bind(limit)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list posts: {:?}", e);
        AppError::from(e)
    })?;

    let posts: Vec<PostResponse> = records.into_iter().map(PostResponse::from).collect();
    Ok(Json(posts))
}

/// List all of the caller's own posts, private ones included.
pub async fn list_my_posts(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let limit = params.limit.unwrap_or(20).clamp(1, 100);

    let records = sqlx::query_as::<_, PostRecord>(
        r#"
        SELECT p.id, p.user_id, u.username AS author_username,
               p.title, p.content, p.is_private, p.created_at
        FROM posts p
        JOIN users u ON p.user_id = u.id
        WHERE p.user_id = $1 AND p.deleted_at IS NULL
          AND ($2::TIMESTAMPTZ IS NULL OR p.created_at < $2)
        ORDER BY p.created_at DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(params.cursor)
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    let posts: Vec<PostResponse> = records.into_iter().map(PostResponse::from).collect();
    Ok(Json(posts))
}

/// Get a single post by ID, with title and body rendered to safe HTML.
///
/// A private post is reported as missing to everyone but its author, so its
/// existence is not revealed.
pub async fn get_post(
    State(pool): State<PgPool>,
    Extension(viewer): Extension<OptionalClaims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let record = sqlx::query_as::<_, PostRecord>(
        r#"
        SELECT p.id, p.user_id, u.username AS author_username,
               p.title, p.content, p.is_private, p.created_at
        FROM posts p
        JOIN users u ON p.user_id = u.id
        WHERE p.id = $1 AND p.deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Post not found".to_string()))?;

    if record.is_private && viewer.user_id() != Some(record.user_id) {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    Ok(Json(PostResponse::from(record)))
}

/// Delete a post (Soft Delete). Author only.
pub async fn delete_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let owner_id: i64 =
        sqlx::query_scalar("SELECT user_id FROM posts WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::NotFound("Post not found".to_string()))?;

    if owner_id != user_id {
        return Err(AppError::AuthError(
            "You are not authorized to delete this post".to_string(),
        ));
    }

    sqlx::query("UPDATE posts SET deleted_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete post: {:?}", e);
            AppError::from(e)
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Check that a post exists and is visible to the viewer.
///
/// Private posts are indistinguishable from missing ones for non-authors.
pub(crate) async fn ensure_post_visible(
    pool: &PgPool,
    post_id: i64,
    viewer_id: Option<i64>,
) -> Result<(), AppError> {
    let (owner_id, is_private) = sqlx::query_as::<_, (i64, bool)>(
        "SELECT user_id, is_private FROM posts WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Post not found".to_string()))?;

    if is_private && viewer_id != Some(owner_id) {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    Ok(())
}
