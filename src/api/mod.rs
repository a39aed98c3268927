pub mod handlers;

use axum::http::HeaderValue;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;
use crate::gemini::SentimentModel;
use crate::youtube::CommentSource;

/// Credential/model summary reported by `/debug`.
#[derive(Clone)]
pub struct DebugInfo {
    pub youtube_api_key_set: bool,
    pub gemini_api_key_set: bool,
    pub model_in_use: String,
}

/// Shared state for API handlers, built once at startup.
#[derive(Clone)]
pub struct ApiState {
    pub comments: Arc<dyn CommentSource>,
    pub model: Arc<dyn SentimentModel>,
    pub debug: DebugInfo,
}

/// Create and configure the API router
pub fn create_router(state: ApiState, cfg: &Config) -> Router {
    // Pin CORS to the configured front-end origin; fall back to any origin
    // if the value is not a valid header (adjust for production).
    let origin = cfg
        .allowed_origin
        .parse::<HeaderValue>()
        .map(AllowOrigin::exact)
        .unwrap_or_else(|_| AllowOrigin::any());

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/analyze", get(handlers::analyze))
        .route("/debug", get(handlers::debug))
        .layer(cors)
        .with_state(state)
}
