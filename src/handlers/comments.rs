use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::comment::{
    Comment, CommentWithAuthor, CreateCommentRequest, UpdateCommentRequest,
};
use crate::models::user::Author;
use crate::AppState;

#[derive(Debug, FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    user_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    username: String,
}

impl From<CommentRow> for CommentWithAuthor {
    fn from(row: CommentRow) -> Self {
        Self {
            user: Author {
                id: row.user_id,
                username: row.username,
            },
            comment: Comment {
                id: row.id,
                post_id: row.post_id,
                user_id: row.user_id,
                content: row.content,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

pub async fn fetch_comments_with_authors(
    db: &PgPool,
    post_id: Uuid,
) -> AppResult<Vec<CommentWithAuthor>> {
    let rows = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.post_id, c.user_id, c.content, c.created_at, c.updated_at, u.username
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.post_id = $1
        ORDER BY c.created_at DESC
        "#,
    )
    .bind(post_id)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(CommentWithAuthor::from).collect())
}

pub async fn list_comments_by_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<Vec<CommentWithAuthor>>> {
    let comments = fetch_comments_with_authors(&state.db, post_id).await?;
    Ok(Json(comments))
}

/// Insert a comment and bump the post's comment counter in one transaction.
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<CommentWithAuthor>)> {
    if body.content.is_empty() {
        return Err(AppError::Validation("Comment content is required".into()));
    }

    let post_exists =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE id = $1")
            .bind(body.post_id)
            .fetch_one(&state.db)
            .await?;

    if post_exists == 0 {
        return Err(AppError::NotFound("Post not found".into()));
    }

    let mut tx = state.db.begin().await?;

    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (id, post_id, user_id, content)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(body.post_id)
    .bind(auth_user.id)
    .bind(&body.content)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE posts SET comments_count = comments_count + 1 WHERE id = $1")
        .bind(body.post_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let user = sqlx::query_as::<_, Author>("SELECT id, username FROM users WHERE id = $1")
        .bind(auth_user.id)
        .fetch_one(&state.db)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentWithAuthor { comment, user }),
    ))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(comment_id): Path<Uuid>,
    Json(body): Json<UpdateCommentRequest>,
) -> AppResult<Json<CommentWithAuthor>> {
    if body.content.is_empty() {
        return Err(AppError::Validation("Comment content is required".into()));
    }

    let existing = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
        .bind(comment_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Comment not found".into()))?;

    if existing.user_id != auth_user.id {
        return Err(AppError::Forbidden);
    }

    let comment = sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments SET content = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(comment_id)
    .bind(&body.content)
    .fetch_one(&state.db)
    .await?;

    let user = sqlx::query_as::<_, Author>("SELECT id, username FROM users WHERE id = $1")
        .bind(comment.user_id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(CommentWithAuthor { comment, user }))
}

/// Comment owner or post owner may delete; the counter decrement rides the
/// same transaction as the delete.
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(comment_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let existing = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
        .bind(comment_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Comment not found".into()))?;

    let post_owner = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM posts WHERE id = $1")
        .bind(existing.post_id)
        .fetch_optional(&state.db)
        .await?;

    if existing.user_id != auth_user.id && post_owner != Some(auth_user.id) {
        return Err(AppError::Forbidden);
    }

    let mut tx = state.db.begin().await?;

    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE posts SET comments_count = comments_count - 1 WHERE id = $1")
        .bind(existing.post_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(
        serde_json::json!({ "message": "Comment deleted successfully" }),
    ))
}
