use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::meditation::{CreateMeditationRequest, Meditation, UpdateMeditationRequest};
use crate::AppState;

pub async fn list_meditations(State(state): State<AppState>) -> AppResult<Json<Vec<Meditation>>> {
    let meditations =
        sqlx::query_as::<_, Meditation>("SELECT * FROM meditations ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(meditations))
}

pub async fn get_meditation(
    State(state): State<AppState>,
    Path(meditation_id): Path<Uuid>,
) -> AppResult<Json<Meditation>> {
    let meditation = sqlx::query_as::<_, Meditation>("SELECT * FROM meditations WHERE id = $1")
        .bind(meditation_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Meditation not found".into()))?;

    Ok(Json(meditation))
}

pub async fn create_meditation(
    State(state): State<AppState>,
    Json(body): Json<CreateMeditationRequest>,
) -> AppResult<(StatusCode, Json<Meditation>)> {
    let (title, description, duration) = match (&body.title, &body.description, &body.duration) {
        (Some(t), Some(d), Some(dur)) if !t.is_empty() && !d.is_empty() && !dur.is_empty() => {
            (t, d, dur)
        }
        _ => {
            return Err(AppError::Validation(
                "Required fields missing: title, description, and duration are required".into(),
            ))
        }
    };

    let meditation = sqlx::query_as::<_, Meditation>(
        r#"
        INSERT INTO meditations (id, title, description, long_description, duration, image_url, link, steps)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(title)
    .bind(description)
    .bind(body.long_description.as_deref().unwrap_or(""))
    .bind(duration)
    .bind(body.image_url.as_deref().unwrap_or(""))
    .bind(&body.link)
    .bind(body.steps.as_ref().unwrap_or(&serde_json::json!([])))
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(meditation)))
}

pub async fn update_meditation(
    State(state): State<AppState>,
    Path(meditation_id): Path<Uuid>,
    Json(body): Json<UpdateMeditationRequest>,
) -> AppResult<Json<Meditation>> {
    let _existing = sqlx::query_as::<_, Meditation>("SELECT * FROM meditations WHERE id = $1")
        .bind(meditation_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Meditation not found".into()))?;

    let meditation = sqlx::query_as::<_, Meditation>(
        r#"
        UPDATE meditations SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            long_description = COALESCE($4, long_description),
            duration = COALESCE($5, duration),
            image_url = COALESCE($6, image_url),
            link = COALESCE($7, link),
            steps = COALESCE($8, steps),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(meditation_id)
    .bind(&body.title)
    .bind(&body.description)
    .bind(&body.long_description)
    .bind(&body.duration)
    .bind(&body.image_url)
    .bind(&body.link)
    .bind(&body.steps)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(meditation))
}

pub async fn delete_meditation(
    State(state): State<AppState>,
    Path(meditation_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM meditations WHERE id = $1")
        .bind(meditation_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Meditation not found".into()));
    }

    Ok(Json(
        serde_json::json!({ "message": "Meditation deleted successfully" }),
    ))
}
