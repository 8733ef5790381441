pub mod auth;
pub mod chat;
pub mod comments;
pub mod health;
pub mod journals;
pub mod livekit;
pub mod meditations;
pub mod moods;
pub mod posts;
