use std::error::Error;
use std::sync::Arc;

use log::info;

use crate::api::{ApiState, DebugInfo};
use crate::config::Config;
use crate::gemini::GeminiModel;
use crate::youtube::YouTubeClient;

mod api;
mod config;
mod error;
mod gemini;
mod youtube;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    // Logging
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    // Load config; a missing key aborts here rather than per-request.
    let cfg = Config::from_env()?;

    let state = ApiState {
        comments: Arc::new(YouTubeClient::new(cfg.youtube_api_key.clone())),
        model: Arc::new(GeminiModel::new(
            cfg.gemini_api_key.clone(),
            cfg.gemini_model.clone(),
        )),
        debug: DebugInfo {
            youtube_api_key_set: !cfg.youtube_api_key.is_empty(),
            gemini_api_key_set: !cfg.gemini_api_key.is_empty(),
            model_in_use: cfg.gemini_model.clone(),
        },
    };

    let app = api::create_router(state, &cfg);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    info!(
        "Listening on {} with model {}",
        cfg.bind_addr, cfg.gemini_model
    );

    axum::serve(listener, app).await?;

    Ok(())
}
