//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api`
//! - Authentication middleware
//! - Error responses

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use cognitax_core::chat::ChatService;
use cognitax_core::extraction::GeminiClient;
use cognitax_core::ingestion::IngestionService;
use cognitax_db::{ChatTurnRepository, UploadRepository};
use cognitax_shared::JwtService;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Statement ingestion wired to the database and the Gemini client.
pub type Ingestion = IngestionService<UploadRepository, GeminiClient>;

/// Tax assistant wired to the database and the Gemini client.
pub type Chat = ChatService<ChatTurnRepository, GeminiClient>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Statement ingestion pipeline.
    pub ingestion: Arc<Ingestion>,
    /// Tax assistant.
    pub chat: Arc<Chat>,
}

/// Creates the main application router.
pub fn create_router(state: AppState, cors_origins: &str) -> Router {
    Router::new()
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Builds the CORS layer from a comma-separated origin list; `*` allows any.
pub fn cors_layer(origins: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.split(',').any(|o| o.trim() == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}
