use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::mood::{
    CreateMoodRequest, DistributionQuery, MoodDistributionResponse, MoodHistoryQuery, MoodSession,
    MoodStatsResponse, StatsQuery, UpdateMoodRequest,
};
use crate::services::analytics;
use crate::AppState;

/// Start a new mood session, closing whichever one is still open. The close
/// and the insert run in one transaction so a user can never end up with two
/// open sessions.
pub async fn create_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateMoodRequest>,
) -> AppResult<(StatusCode, Json<MoodSession>)> {
    if body.mood.is_empty() {
        return Err(AppError::Validation("Mood is required".into()));
    }

    let now = Utc::now();
    let mut tx = state.db.begin().await?;

    sqlx::query(
        r#"
        UPDATE mood_history
        SET end_time = $2,
            duration_minutes = ROUND(EXTRACT(EPOCH FROM ($2 - start_time)) / 60.0)::int
        WHERE user_id = $1 AND end_time IS NULL
        "#,
    )
    .bind(auth_user.id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let session = sqlx::query_as::<_, MoodSession>(
        r#"
        INSERT INTO mood_history (id, user_id, mood, start_time)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.mood)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn get_active_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<MoodSession>> {
    let session = sqlx::query_as::<_, MoodSession>(
        "SELECT * FROM mood_history WHERE user_id = $1 AND end_time IS NULL",
    )
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("No active mood found".into()))?;

    Ok(Json(session))
}

/// Close or re-close a session. Existence and ownership are checked with one
/// combined lookup, so a foreign session reads as missing.
pub async fn update_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(mood_id): Path<Uuid>,
    Json(body): Json<UpdateMoodRequest>,
) -> AppResult<Json<MoodSession>> {
    let session = sqlx::query_as::<_, MoodSession>(
        "SELECT * FROM mood_history WHERE id = $1 AND user_id = $2",
    )
    .bind(mood_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Mood entry not found".into()))?;

    let end_time = body.end_time.unwrap_or_else(Utc::now);
    let duration = analytics::duration_minutes(session.start_time, end_time);

    let updated = sqlx::query_as::<_, MoodSession>(
        r#"
        UPDATE mood_history
        SET end_time = $2, duration_minutes = $3
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(mood_id)
    .bind(end_time)
    .bind(duration)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

pub async fn get_mood_history(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodHistoryQuery>,
) -> AppResult<Json<Vec<MoodSession>>> {
    // NULL limit/offset mean "no limit" / "no skip" in Postgres
    let history = sqlx::query_as::<_, MoodSession>(
        r#"
        SELECT * FROM mood_history
        WHERE user_id = $1
        ORDER BY start_time DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(auth_user.id)
    .bind(query.limit)
    .bind(query.offset)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(history))
}

pub async fn get_mood_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<MoodStatsResponse>> {
    let days = query.days.unwrap_or(7);
    let start = Utc::now() - chrono::Duration::days(days);

    let history = sqlx::query_as::<_, MoodSession>(
        r#"
        SELECT * FROM mood_history
        WHERE user_id = $1 AND start_time >= $2 AND end_time IS NOT NULL
        ORDER BY start_time ASC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .fetch_all(&state.db)
    .await?;

    let (total_minutes, stats) = analytics::aggregate_stats(&history);

    Ok(Json(MoodStatsResponse {
        period: format!("{} days", days),
        total_minutes,
        stats,
        history,
    }))
}

pub async fn get_mood_distribution(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DistributionQuery>,
) -> AppResult<Json<MoodDistributionResponse>> {
    let entries = sqlx::query_as::<_, MoodSession>(
        r#"
        SELECT * FROM mood_history
        WHERE user_id = $1
          AND ($2::timestamptz IS NULL OR created_at >= $2)
          AND ($3::timestamptz IS NULL OR created_at <= $3)
        "#,
    )
    .bind(auth_user.id)
    .bind(query.start_date)
    .bind(query.end_date)
    .fetch_all(&state.db)
    .await?;

    let (total_entries, distribution) = analytics::mood_distribution(&entries);

    Ok(Json(MoodDistributionResponse {
        total_entries,
        distribution,
    }))
}
