use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A contiguous interval during which a user self-reported a single mood.
/// Open sessions have `end_time = NULL`; at most one open session exists per
/// user at any time (enforced by a partial unique index and transactional
/// rotation in the handler).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMoodRequest {
    pub mood: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMoodRequest {
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct MoodHistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DistributionQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub days: Option<i64>,
}

/// Per-mood slice of the time-weighted stats aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MoodStatEntry {
    pub total_minutes: i64,
    pub percentage: f64,
    pub count: i64,
}

/// GET /api/mood/stats response: aggregates plus the raw filtered sessions.
#[derive(Debug, Serialize)]
pub struct MoodStatsResponse {
    pub period: String,
    pub total_minutes: i64,
    pub stats: HashMap<String, MoodStatEntry>,
    pub history: Vec<MoodSession>,
}

/// GET /api/mood/distribution response. `total_entries` counts every matched
/// row; the percentages cover only the fixed taxonomy.
#[derive(Debug, Serialize)]
pub struct MoodDistributionResponse {
    pub total_entries: i64,
    pub distribution: BTreeMap<String, f64>,
}

/// GET /api/chat/progress response.
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub period_days: i64,
    pub growth_percentage: i64,
    pub positive_mood_percentage: f64,
    pub message: String,
}
