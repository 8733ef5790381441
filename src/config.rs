use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub jwt_secret: String,
    pub jwt_access_ttl_secs: i64,
    pub jwt_refresh_ttl_secs: i64,

    pub groq_api_key: String,
    pub groq_chat_model: String,
    pub groq_analysis_model: String,

    pub livekit_api_key: String,
    pub livekit_api_secret: String,
    pub livekit_token_ttl_secs: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".into())
                .parse()
                .expect("DB_MAX_CONNECTIONS must be a number"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_access_ttl_secs: env::var("JWT_ACCESS_TTL_SECS")
                .unwrap_or_else(|_| "900".into())
                .parse()
                .expect("JWT_ACCESS_TTL_SECS must be a number"),
            jwt_refresh_ttl_secs: env::var("JWT_REFRESH_TTL_SECS")
                .unwrap_or_else(|_| "604800".into())
                .parse()
                .expect("JWT_REFRESH_TTL_SECS must be a number"),

            groq_api_key: env::var("GROQ_API_KEY").unwrap_or_else(|_| String::new()),
            groq_chat_model: env::var("GROQ_CHAT_MODEL")
                .unwrap_or_else(|_| "llama-3.1-8b-instant".into()),
            groq_analysis_model: env::var("GROQ_ANALYSIS_MODEL")
                .unwrap_or_else(|_| "llama3-8b-8192".into()),

            livekit_api_key: env::var("LIVEKIT_API_KEY").unwrap_or_else(|_| String::new()),
            livekit_api_secret: env::var("LIVEKIT_API_SECRET").unwrap_or_else(|_| String::new()),
            livekit_token_ttl_secs: env::var("LIVEKIT_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "600".into()) // 10 minutes
                .parse()
                .unwrap_or(600),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
