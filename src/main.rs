use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;

use auth::rate_limit::RateLimitState;
use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nuna_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env();
    let config = Arc::new(config);

    // Database
    let db = db::create_pool(&config.database_url, config.db_max_connections).await;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations applied");

    let rate_limiter = RateLimitState::new();

    let state = AppState {
        db,
        config: config.clone(),
        rate_limiter,
    };

    // Auth routes with rate limiting
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        // Social feed reads are public
        .route("/api/posts", get(handlers::posts::list_posts))
        .route("/api/posts/:id", get(handlers::posts::get_post))
        .route(
            "/api/posts/user/:user_id",
            get(handlers::posts::list_posts_by_user),
        )
        .route(
            "/api/comments/post/:post_id",
            get(handlers::comments::list_comments_by_post),
        )
        // Meditation resources are public, as is their management
        .route("/api/meditate", get(handlers::meditations::list_meditations))
        .route("/api/meditate", post(handlers::meditations::create_meditation))
        .route("/api/meditate/:id", get(handlers::meditations::get_meditation))
        .route("/api/meditate/:id", put(handlers::meditations::update_meditation))
        .route(
            "/api/meditate/:id",
            delete(handlers::meditations::delete_meditation),
        )
        .merge(auth_routes);

    let protected_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/profile", get(handlers::auth::profile))
        // Journals
        .route("/api/journals", get(handlers::journals::list_journals))
        .route("/api/journals", post(handlers::journals::create_journal))
        .route("/api/journals/:id", get(handlers::journals::get_journal))
        .route("/api/journals/:id", put(handlers::journals::update_journal))
        .route("/api/journals/:id", delete(handlers::journals::delete_journal))
        // Mood sessions
        .route("/api/mood", post(handlers::moods::create_mood))
        .route("/api/mood", get(handlers::moods::get_mood_history))
        .route("/api/mood/active", get(handlers::moods::get_active_mood))
        .route("/api/mood/stats", get(handlers::moods::get_mood_stats))
        .route(
            "/api/mood/distribution",
            get(handlers::moods::get_mood_distribution),
        )
        .route("/api/mood/:id", put(handlers::moods::update_mood))
        // Posts
        .route("/api/posts", post(handlers::posts::create_post))
        .route("/api/posts/my/posts", get(handlers::posts::list_my_posts))
        .route("/api/posts/:id", put(handlers::posts::update_post))
        .route("/api/posts/:id", delete(handlers::posts::delete_post))
        .route("/api/posts/:id/like", post(handlers::posts::like_post))
        .route("/api/posts/:id/unlike", post(handlers::posts::unlike_post))
        // Comments
        .route("/api/comments", post(handlers::comments::create_comment))
        .route("/api/comments/:id", put(handlers::comments::update_comment))
        .route(
            "/api/comments/:id",
            delete(handlers::comments::delete_comment),
        )
        // Chat & analysis
        .route("/api/chat", post(handlers::chat::chat_with_ai))
        .route(
            "/api/chat/recommendations",
            get(handlers::chat::get_recommendations),
        )
        .route("/api/chat/patterns", get(handlers::chat::get_patterns))
        .route("/api/chat/progress", get(handlers::chat::get_progress))
        // Video rooms
        .route("/api/livekit/token", post(handlers::livekit::create_token))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let allowed_origins: Vec<axum::http::HeaderValue> = {
        let mut origins = vec![config
            .frontend_url
            .parse::<axum::http::HeaderValue>()
            .unwrap()];
        // In dev, also allow LAN access (e.g. testing from another device)
        if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
            for o in extra.split(',') {
                if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                    origins.push(hv);
                }
            }
        }
        origins
    };
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    // Use into_make_service_with_connect_info to provide client IP for rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .unwrap();
}
