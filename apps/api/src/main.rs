mod config;
mod errors;
mod generation;
mod llm_client;
mod profile;
mod routes;
mod speaker;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::generator::TopicGenerator;
use crate::llm_client::GeminiClient;
use crate::profile::pdf::PdfExtractProvider;
use crate::routes::build_router;
use crate::speaker::github::{GithubClient, ProfileLookup};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalkForge API v{}", env!("CARGO_PKG_VERSION"));

    let github: Arc<dyn ProfileLookup> = Arc::new(GithubClient::new(&config.github_api_url)?);
    info!("GitHub client initialized ({})", config.github_api_url);

    let llm = Arc::new(GeminiClient::new(&config.gemini_endpoint)?);
    if config.gemini_api_key.is_none() {
        info!("No server Gemini key configured; requests must supply api_key");
    }

    let generator = TopicGenerator::new(llm, github.clone());
    let state = AppState::new(config.clone(), Arc::new(PdfExtractProvider), github, generator);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
