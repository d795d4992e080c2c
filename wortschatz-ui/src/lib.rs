//! wortschatz-ui library - vocabulary trainer web service
//!
//! Exposes the application state and the route table so integration tests
//! can drive the router directly.

use axum::Router;
use sqlx::SqlitePool;

pub mod api;
pub mod db;
pub mod error;
pub mod services;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Secret signing bearer credentials
    pub token_secret: i64,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, token_secret: i64) -> Self {
        Self { db, token_secret }
    }
}

/// Build application router
///
/// One explicit route table; authentication and the admin requirement are
/// enforced by the `AuthUser` / `AdminUser` extractors on each handler.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};
    use tower_http::trace::TraceLayer;

    Router::new()
        // Auth
        .route("/api/auth/signup", post(api::signup))
        .route("/api/auth/login", post(api::login))
        .route("/api/auth/forgot-password", post(api::forgot_password))
        .route("/api/auth/reset-password", post(api::reset_password))
        .route("/api/auth/user", get(api::get_current_user))
        // Vocabulary catalog (public read, admin mutation)
        .route("/api/vocabulary", get(api::list_vocabulary).post(api::create_vocabulary))
        .route(
            "/api/vocabulary/:id",
            put(api::update_vocabulary).delete(api::delete_vocabulary),
        )
        .route("/api/vocabulary/import", post(api::bulk_import))
        // Learning
        .route("/api/flashcards", get(api::get_flashcards))
        .route("/api/flashcards/progress", post(api::submit_review))
        .route("/api/progress", get(api::get_progress))
        // Health (no auth)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
