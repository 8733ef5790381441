use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::journal::{CreateJournalRequest, Journal, UpdateJournalRequest};
use crate::AppState;

pub async fn list_journals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Journal>>> {
    let journals = sqlx::query_as::<_, Journal>(
        r#"
        SELECT * FROM journals
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(journals))
}

pub async fn get_journal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(journal_id): Path<Uuid>,
) -> AppResult<Json<Journal>> {
    let journal = load_owned_journal(&state, journal_id, auth_user.id).await?;
    Ok(Json(journal))
}

pub async fn create_journal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateJournalRequest>,
) -> AppResult<(StatusCode, Json<Journal>)> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let journal = sqlx::query_as::<_, Journal>(
        r#"
        INSERT INTO journals (id, user_id, title, content, mood)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.title)
    .bind(&body.content)
    .bind(body.mood.as_deref().unwrap_or("neutral"))
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(journal)))
}

pub async fn update_journal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(journal_id): Path<Uuid>,
    Json(body): Json<UpdateJournalRequest>,
) -> AppResult<Json<Journal>> {
    let _existing = load_owned_journal(&state, journal_id, auth_user.id).await?;

    let journal = sqlx::query_as::<_, Journal>(
        r#"
        UPDATE journals SET
            title = COALESCE($2, title),
            content = COALESCE($3, content),
            mood = COALESCE($4, mood),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(journal_id)
    .bind(&body.title)
    .bind(&body.content)
    .bind(&body.mood)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(journal))
}

pub async fn delete_journal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(journal_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let _existing = load_owned_journal(&state, journal_id, auth_user.id).await?;

    sqlx::query("DELETE FROM journals WHERE id = $1")
        .bind(journal_id)
        .execute(&state.db)
        .await?;

    Ok(Json(
        serde_json::json!({ "message": "Journal deleted successfully" }),
    ))
}

/// Load a journal and check ownership separately, so a missing journal and a
/// foreign journal produce distinct errors (404 vs 403).
async fn load_owned_journal(
    state: &AppState,
    journal_id: Uuid,
    user_id: Uuid,
) -> AppResult<Journal> {
    let journal = sqlx::query_as::<_, Journal>("SELECT * FROM journals WHERE id = $1")
        .bind(journal_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Journal not found".into()))?;

    if journal.user_id != user_id {
        return Err(AppError::Forbidden);
    }

    Ok(journal)
}
