use std::{sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod aws_clients;
mod captions;
mod config;
mod domain;
mod errors;
mod fallback;
mod handlers;
mod llm;
mod models;
mod orchestrator;
mod renderer;
mod repositories;
mod retry;
mod routes;
mod startup;
mod storage;
mod templates;

use crate::config::Config;
use crate::domain::HistoryStore;
use crate::errors::AppError;
use crate::llm::GroqCaptionClient;
use crate::orchestrator::MemeOrchestrator;
use crate::renderer::MemegenClient;

/// AppState holds shared resources for the web server.
pub struct AppState {
    pub orchestrator: MemeOrchestrator,
    pub history: Arc<dyn HistoryStore>,
    pub groq_configured: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "meme_forge=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = Config::load()?;
    if config.groq_api_key.is_none() {
        tracing::warn!("GROQ_API_KEY is not set; every caption request will fail");
    }

    // --- Outbound clients ---
    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| AppError::InitError(format!("Failed to build HTTP client: {}", e)))?;
    let captions = Arc::new(GroqCaptionClient::new(
        http.clone(),
        config.groq_api_base.clone(),
        config.groq_api_key.clone(),
    ));
    let renderer = Arc::new(MemegenClient::new(http, config.memegen_base_url.clone()));
    let orchestrator = MemeOrchestrator::new(captions, renderer);

    // --- History backend ---
    let history = startup::init_history_store(&config).await?;

    // --- Application State ---
    let state = Arc::new(AppState {
        groq_configured: config.groq_api_key.is_some(),
        orchestrator,
        history,
    });

    let app = routes::create_router(state, config.static_dir.as_deref());

    // --- Server Startup ---
    tracing::info!(
        templates = templates::MEMEGEN_TEMPLATES.len(),
        "Server listening on http://{}",
        config.bind_address
    );

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
