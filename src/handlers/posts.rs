use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::handlers::comments::fetch_comments_with_authors;
use crate::models::post::{CreatePostRequest, Post, PostWithDetails, UpdatePostRequest};
use crate::models::user::Author;
use crate::AppState;

pub async fn list_posts(State(state): State<AppState>) -> AppResult<Json<Vec<PostWithDetails>>> {
    let posts = sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;

    let mut result = Vec::with_capacity(posts.len());
    for post in posts {
        result.push(with_details(&state, post).await?);
    }

    Ok(Json(result))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<PostWithDetails>> {
    let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Post not found".into()))?;

    Ok(Json(with_details(&state, post).await?))
}

pub async fn list_posts_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<PostWithDetails>>> {
    list_for_user(&state, user_id).await.map(Json)
}

pub async fn list_my_posts(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<PostWithDetails>>> {
    list_for_user(&state, auth_user.id).await.map(Json)
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<Post>)> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (id, user_id, title, content, tags)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.title)
    .bind(&body.content)
    .bind(body.tags.as_deref().unwrap_or(&[]))
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
    Json(body): Json<UpdatePostRequest>,
) -> AppResult<Json<Post>> {
    let _existing = load_owned_post(&state, post_id, auth_user.id).await?;

    let post = sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts SET
            title = COALESCE($2, title),
            content = COALESCE($3, content),
            tags = COALESCE($4, tags),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(post_id)
    .bind(&body.title)
    .bind(&body.content)
    .bind(&body.tags)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let _existing = load_owned_post(&state, post_id, auth_user.id).await?;

    let mut tx = state.db.begin().await?;

    sqlx::query("DELETE FROM comments WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(
        serde_json::json!({ "message": "Post deleted successfully" }),
    ))
}

pub async fn like_post(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let likes = sqlx::query_scalar::<_, i32>(
        "UPDATE posts SET likes = likes + 1 WHERE id = $1 RETURNING likes",
    )
    .bind(post_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Post not found".into()))?;

    Ok(Json(serde_json::json!({
        "message": "Post liked successfully",
        "likes": likes,
    })))
}

pub async fn unlike_post(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Post not found".into()))?;

    if post.likes <= 0 {
        return Err(AppError::Validation("Post has no likes to remove".into()));
    }

    let likes = sqlx::query_scalar::<_, i32>(
        "UPDATE posts SET likes = likes - 1 WHERE id = $1 AND likes > 0 RETURNING likes",
    )
    .bind(post_id)
    .fetch_optional(&state.db)
    .await?
    .unwrap_or(0);

    Ok(Json(serde_json::json!({
        "message": "Post unliked successfully",
        "likes": likes,
    })))
}

async fn list_for_user(state: &AppState, user_id: Uuid) -> AppResult<Vec<PostWithDetails>> {
    let posts = sqlx::query_as::<_, Post>(
        "SELECT * FROM posts WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;

    let mut result = Vec::with_capacity(posts.len());
    for post in posts {
        result.push(with_details(state, post).await?);
    }

    Ok(result)
}

async fn with_details(state: &AppState, post: Post) -> AppResult<PostWithDetails> {
    let user = sqlx::query_as::<_, Author>("SELECT id, username FROM users WHERE id = $1")
        .bind(post.user_id)
        .fetch_one(&state.db)
        .await?;

    let comments = fetch_comments_with_authors(&state.db, post.id).await?;

    Ok(PostWithDetails {
        post,
        user,
        comments,
    })
}

/// Load a post and check ownership separately, so 404 and 403 stay distinct.
async fn load_owned_post(state: &AppState, post_id: Uuid, user_id: Uuid) -> AppResult<Post> {
    let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Post not found".into()))?;

    if post.user_id != user_id {
        return Err(AppError::Forbidden);
    }

    Ok(post)
}
