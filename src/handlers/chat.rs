use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::journal::Journal;
use crate::models::mood::{MoodSession, ProgressQuery, ProgressResponse};
use crate::services::analytics;
use crate::services::groq::{chat_completion, ChatMessage};
use crate::AppState;

const CHAT_SYSTEM_PROMPT: &str = "Anda adalah seorang ahli psikologi. Berikan jawaban yang \
informatif dan mendukung dengan bahasa yang mudah dipahami. Jawab dengan bahasa Indonesia.";

const ANALYSIS_SYSTEM_PROMPT: &str = "Anda adalah seorang ahli psikologi dengan pengalaman \
bertahun-tahun. Berikan analisis yang mendalam dan personal tentang pola mood pengguna \
berdasarkan jurnal mereka. Identifikasi tren, wawasan psikologis, dan berikan rekomendasi \
praktis untuk menjaga kesehatan mental. Jawab dengan bahasa Indonesia yang empatik, mendukung, \
dan mudah dipahami.";

const PATTERN_SYSTEM_PROMPT: &str = "Anda adalah seorang ahli psikologi dengan pengalaman \
bertahun-tahun. Fokuslah pada identifikasi pola: kapan mood pengguna cenderung membaik atau \
memburuk, pemicu yang berulang di jurnal mereka, dan hubungan antara aktivitas dan perasaan. \
Jawab dengan bahasa Indonesia yang empatik dan mudah dipahami.";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

/// POST /api/chat — free-form conversation with the psychologist persona.
pub async fn chat_with_ai(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthUser>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let message = match body.message.as_deref() {
        Some(m) if !m.is_empty() => m,
        _ => return Err(AppError::Validation("Message is required".into())),
    };

    let messages = [
        ChatMessage {
            role: "user",
            content: message,
        },
        ChatMessage {
            role: "system",
            content: CHAT_SYSTEM_PROMPT,
        },
    ];

    let content = chat_completion(&state.config, &state.config.groq_chat_model, 1.0, &messages)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(serde_json::json!({
        "role": "bot",
        "content": content,
    })))
}

/// GET /api/chat/recommendations — analyze the latest journals and return
/// personalized mental-health recommendations.
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<serde_json::Value>> {
    // Only the 10 most recent journals keep the analysis focused
    let journals = sqlx::query_as::<_, Journal>(
        r#"
        SELECT * FROM journals
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT 10
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    if journals.is_empty() {
        return Err(AppError::NotFound(
            "No journal entries found for analysis".into(),
        ));
    }

    let formatted_data = format!(
        "JURNAL PENGGUNA:\n{}\n\nRINGKASAN MOOD:\n{}",
        format_journal_blocks(&journals),
        format_mood_counts(&journals),
    );

    let user_prompt = format!(
        "Berikut adalah data jurnal saya beberapa waktu terakhir:\n\n{}\n\nTolong analisis pola \
         mood dan keadaan psikologis saya berdasarkan jurnal-jurnal ini. Berikan wawasan tentang \
         pola yang mungkin tidak saya sadari dan rekomendasi untuk meningkatkan kesehatan mental \
         saya.",
        formatted_data
    );

    let messages = [
        ChatMessage {
            role: "system",
            content: ANALYSIS_SYSTEM_PROMPT,
        },
        ChatMessage {
            role: "user",
            content: &user_prompt,
        },
    ];

    let content = chat_completion(
        &state.config,
        &state.config.groq_analysis_model,
        0.7,
        &messages,
    )
    .await
    .map_err(AppError::Internal)?;

    Ok(Json(serde_json::json!({ "response": content })))
}

/// GET /api/chat/patterns — analyze recurring patterns across journals and
/// tracked mood sessions.
pub async fn get_patterns(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<serde_json::Value>> {
    let journals = sqlx::query_as::<_, Journal>(
        r#"
        SELECT * FROM journals
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT 10
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    let thirty_days_ago = Utc::now() - chrono::Duration::days(30);
    let sessions = sqlx::query_as::<_, MoodSession>(
        r#"
        SELECT * FROM mood_history
        WHERE user_id = $1 AND start_time >= $2 AND end_time IS NOT NULL
        ORDER BY start_time ASC
        "#,
    )
    .bind(auth_user.id)
    .bind(thirty_days_ago)
    .fetch_all(&state.db)
    .await?;

    if journals.is_empty() && sessions.is_empty() {
        return Err(AppError::NotFound(
            "No journal or mood data found for analysis".into(),
        ));
    }

    let user_prompt = format!(
        "Berikut adalah data jurnal dan riwayat mood saya:\n\nJURNAL PENGGUNA:\n{}\n\nWAKTU PER \
         MOOD (30 HARI TERAKHIR):\n{}\n\nTolong identifikasi pola mood saya: kapan mood saya \
         cenderung membaik atau memburuk, dan apa pemicunya berdasarkan data ini.",
        format_journal_blocks(&journals),
        format_session_minutes(&sessions),
    );

    let messages = [
        ChatMessage {
            role: "system",
            content: PATTERN_SYSTEM_PROMPT,
        },
        ChatMessage {
            role: "user",
            content: &user_prompt,
        },
    ];

    let content = chat_completion(
        &state.config,
        &state.config.groq_analysis_model,
        0.7,
        &messages,
    )
    .await
    .map_err(AppError::Internal)?;

    Ok(Json(serde_json::json!({ "response": content })))
}

/// GET /api/chat/progress — local week-over-week trend computation, no LLM.
pub async fn get_progress(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ProgressQuery>,
) -> AppResult<Json<ProgressResponse>> {
    let days = query.days.unwrap_or(30);
    let start = Utc::now() - chrono::Duration::days(days);

    let journals = sqlx::query_as::<_, Journal>(
        r#"
        SELECT * FROM journals
        WHERE user_id = $1 AND created_at >= $2
        ORDER BY created_at ASC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .fetch_all(&state.db)
    .await?;

    let sessions = sqlx::query_as::<_, MoodSession>(
        r#"
        SELECT * FROM mood_history
        WHERE user_id = $1 AND start_time >= $2
        ORDER BY start_time ASC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .fetch_all(&state.db)
    .await?;

    if journals.is_empty() && sessions.is_empty() {
        return Err(AppError::NotFound(
            "No mood or journal data found for analysis".into(),
        ));
    }

    let weeks = analytics::bucket_journals_by_week(&journals);
    let positive_mood_percentage = analytics::positive_mood_percentage(&sessions);
    let growth = analytics::growth_percentage(&weeks, positive_mood_percentage);

    Ok(Json(ProgressResponse {
        period_days: days,
        growth_percentage: growth,
        positive_mood_percentage,
        message: analytics::progress_message(days, growth),
    }))
}

/// One `Tanggal/Judul/Mood/Isi` block per journal, blank-line separated.
fn format_journal_blocks(journals: &[Journal]) -> String {
    journals
        .iter()
        .map(|j| {
            format!(
                "Tanggal: {}\nJudul: {}\nMood: {}\nIsi: {}",
                j.created_at.format("%d/%m/%Y"),
                j.title,
                j.mood,
                j.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Mood frequency summary ("Baik: 3 kali, Buruk: 1 kali"), first-seen order.
fn format_mood_counts(journals: &[Journal]) -> String {
    let mut counts: Vec<(&str, u32)> = Vec::new();
    for journal in journals {
        match counts.iter().position(|(mood, _)| *mood == journal.mood) {
            Some(i) => counts[i].1 += 1,
            None => counts.push((journal.mood.as_str(), 1)),
        }
    }

    counts
        .iter()
        .map(|(mood, count)| format!("{}: {} kali", mood, count))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Total recorded minutes per mood ("Baik: 120 menit"), first-seen order.
fn format_session_minutes(sessions: &[MoodSession]) -> String {
    let mut minutes: Vec<(&str, i64)> = Vec::new();
    for session in sessions {
        if let Some(m) = session.duration_minutes {
            match minutes.iter().position(|(mood, _)| *mood == session.mood) {
                Some(i) => minutes[i].1 += m as i64,
                None => minutes.push((session.mood.as_str(), m as i64)),
            }
        }
    }

    minutes
        .iter()
        .map(|(mood, total)| format!("{}: {} menit", mood, total))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use uuid::Uuid;

    fn journal(mood: &str, title: &str) -> Journal {
        let created_at = NaiveDateTime::parse_from_str("2024-03-05 10:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc();
        Journal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            content: "isi".into(),
            mood: mood.to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_journal_blocks_layout() {
        let blocks = format_journal_blocks(&[journal("Baik", "Hari yang cerah")]);
        assert!(blocks.starts_with("Tanggal: 05/03/2024"));
        assert!(blocks.contains("Judul: Hari yang cerah"));
        assert!(blocks.contains("Mood: Baik"));
    }

    #[test]
    fn test_mood_counts_keep_first_seen_order() {
        let journals = vec![journal("Baik", "a"), journal("Buruk", "b"), journal("Baik", "c")];
        assert_eq!(format_mood_counts(&journals), "Baik: 2 kali, Buruk: 1 kali");
    }
}
