use axum::{extract::State, Extension, Json};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use rand::Rng;
use serde::Serialize;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::AppState;

const ROOM_NAME_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ROOM_NAME_LENGTH: usize = 6;

/// LiveKit access-token claims: HS256 JWT with the API key as issuer and the
/// room grant under `video`.
#[derive(Debug, Serialize)]
struct LiveKitClaims {
    iss: String,
    sub: String,
    nbf: i64,
    exp: i64,
    video: VideoGrant,
}

#[derive(Debug, Serialize)]
struct VideoGrant {
    #[serde(rename = "roomJoin")]
    room_join: bool,
    room: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub room_name: String,
    pub participant_identity: String,
}

/// POST /api/livekit/token — mint a short-lived join token for a fresh
/// randomly-named room.
pub async fn create_token(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<TokenResponse>> {
    let room_name = generate_room_name(ROOM_NAME_LENGTH);
    let participant_identity = auth_user.id.to_string();

    let now = Utc::now();
    let claims = LiveKitClaims {
        iss: state.config.livekit_api_key.clone(),
        sub: participant_identity.clone(),
        nbf: now.timestamp(),
        exp: (now + Duration::seconds(state.config.livekit_token_ttl_secs)).timestamp(),
        video: VideoGrant {
            room_join: true,
            room: room_name.clone(),
        },
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.livekit_api_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create room token: {}", e)))?;

    Ok(Json(TokenResponse {
        token,
        room_name,
        participant_identity,
    }))
}

fn generate_room_name(length: usize) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..ROOM_NAME_CHARSET.len());
            ROOM_NAME_CHARSET[idx] as char
        })
        .collect();

    format!("room-{}", suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_name_format() {
        let name = generate_room_name(6);
        assert_eq!(name.len(), "room-".len() + 6);
        let suffix = name.strip_prefix("room-").unwrap();
        assert!(suffix
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
    }

    #[test]
    fn test_room_names_are_random() {
        let a = generate_room_name(6);
        let b = generate_room_name(6);
        // 36^6 possibilities; a collision here means the RNG is broken
        assert_ne!(a, b);
    }
}
