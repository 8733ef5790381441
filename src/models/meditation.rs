use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meditation {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub long_description: String,
    pub duration: String,
    pub image_url: String,
    pub link: Option<String>,
    pub steps: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMeditationRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub duration: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub steps: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMeditationRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub duration: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub steps: Option<serde_json::Value>,
}
